//! One structural pass over one file.

use crate::IndentationConfig;
use crate::error::IndentationError;
use crate::factory::{HandlerFactory, is_handled_kind};
use crate::handlers::slist::PrimordialHandler;
use crate::handlers::{ConstructKind, Cx, HandlerId};
use crate::violation::Violation;
use plumb_decree_abi::{Node, SyntaxTree};
use tracing::debug;

enum Step<'t> {
    Enter(Node<'t>),
    Leave,
}

/// Per-file state: handler arena, factory cache, violations.
pub struct CheckSession<'t> {
    tree: &'t SyntaxTree,
    cx: Cx<'t>,
    factory: HandlerFactory,
    primordial: Option<HandlerId>,
}

impl<'t> CheckSession<'t> {
    #[must_use]
    pub fn new(tree: &'t SyntaxTree, config: &'t IndentationConfig) -> Self {
        Self {
            tree,
            cx: Cx::new(tree, config),
            factory: HandlerFactory::new(),
            primordial: None,
        }
    }

    /// Root handler, created on first use.
    fn primordial(&mut self) -> Option<HandlerId> {
        if self.primordial.is_none() {
            let root = self.tree.root()?;
            let id = self
                .cx
                .push(Box::new(PrimordialHandler), ConstructKind::Primordial, root, None);
            self.primordial = Some(id);
        }
        self.primordial
    }

    /// Handler for `node`, parented to the file root when it is new.
    ///
    /// # Errors
    ///
    /// `IndentationError::InvalidArgument` naming the kind when `node` has no handler.
    pub fn handler_for(&mut self, node: Node<'t>) -> Result<HandlerId, IndentationError> {
        let parent = self
            .primordial()
            .ok_or_else(|| IndentationError::InvalidArgument("syntax tree is empty".to_string()))?;
        self.factory.get_handler(&mut self.cx, node, parent)
    }

    /// Walk the tree, checking each handled node as it is entered.
    ///
    /// # Errors
    ///
    /// Propagates factory failures; none occur for well-formed trees.
    pub fn run(mut self) -> Result<Vec<Violation>, IndentationError> {
        let (Some(root), Some(primordial)) = (self.tree.root(), self.primordial()) else {
            return Ok(Vec::new());
        };
        self.cx.check(primordial);

        let mut stack = vec![primordial];
        let mut work = vec![Step::Enter(root)];
        while let Some(step) = work.pop() {
            match step {
                Step::Leave => {
                    stack.pop();
                }
                Step::Enter(node) => {
                    if is_handled_kind(node.kind()) {
                        let parent = stack.last().copied().unwrap_or(primordial);
                        let id = self.factory.get_handler(&mut self.cx, node, parent)?;
                        stack.push(id);
                        self.cx.check(id);
                        work.push(Step::Leave);
                    }
                    let children: Vec<_> = node.children().collect();
                    work.extend(children.into_iter().rev().map(Step::Enter));
                }
            }
        }

        debug!(
            handlers = self.cx.handler_count(),
            cached = self.factory.created_count(),
            "structural pass done"
        );
        self.factory.clear();
        let mut violations = self.cx.into_violations();
        violations.sort_by_key(|violation| (violation.line, violation.column));
        Ok(violations)
    }
}
