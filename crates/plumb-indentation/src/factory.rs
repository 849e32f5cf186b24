//! Kind to handler registry and the per-pass handler cache.

use crate::error::IndentationError;
use crate::handlers::definitions::{
    ClassDefHandler, ImportHandler, MemberDefHandler, MethodDefHandler, ObjectBlockHandler,
    PackageDefHandler, StaticInitHandler,
};
use crate::handlers::expressions::{
    ArrayInitHandler, IndexOpHandler, LambdaHandler, MethodCallHandler, NewHandler,
};
use crate::handlers::slist::SlistHandler;
use crate::handlers::statements::{
    CatchHandler, DoWhileHandler, ElseHandler, FinallyHandler, ForHandler, IfHandler,
    LabelHandler, SynchronizedHandler, TryHandler, WhileHandler,
};
use crate::handlers::switch::{CaseHandler, SwitchHandler, SwitchRuleHandler, YieldHandler};
use crate::handlers::{ConstructKind, Cx, Handler, HandlerId};
use plumb_decree_abi::{Node, NodeId, TokenKind};
use std::collections::HashMap;
use tracing::trace;

type Constructor = fn() -> Box<dyn Handler>;

fn make<H: Handler + Default + 'static>() -> Box<dyn Handler> {
    Box::new(H::default())
}

fn array_init() -> Box<dyn Handler> {
    Box::new(ArrayInitHandler::array())
}

fn annotation_array_init() -> Box<dyn Handler> {
    Box::new(ArrayInitHandler::annotation())
}

/// The registry: which construct and handler a node kind maps to.
fn registration(kind: TokenKind) -> Option<(ConstructKind, Constructor)> {
    use ConstructKind as C;
    let entry: (ConstructKind, Constructor) = match kind {
        TokenKind::CaseGroup => (C::Case, make::<CaseHandler>),
        TokenKind::LiteralSwitch => (C::Switch, make::<SwitchHandler>),
        TokenKind::Slist | TokenKind::InstanceInit => (C::Block, make::<SlistHandler>),
        TokenKind::PackageDef => (C::PackageDef, make::<PackageDefHandler>),
        TokenKind::LiteralElse => (C::Else, make::<ElseHandler>),
        TokenKind::LiteralIf => (C::If, make::<IfHandler>),
        TokenKind::LiteralTry => (C::Try, make::<TryHandler>),
        TokenKind::LiteralCatch => (C::Catch, make::<CatchHandler>),
        TokenKind::LiteralFinally => (C::Finally, make::<FinallyHandler>),
        TokenKind::LiteralDo => (C::DoWhile, make::<DoWhileHandler>),
        TokenKind::LiteralWhile => (C::While, make::<WhileHandler>),
        TokenKind::LiteralFor => (C::For, make::<ForHandler>),
        TokenKind::MethodDef => (C::MethodDef, make::<MethodDefHandler>),
        TokenKind::CtorDef => (C::CtorDef, make::<MethodDefHandler>),
        TokenKind::AnnotationFieldDef => (C::AnnotationFieldDef, make::<MethodDefHandler>),
        TokenKind::CompactCtorDef => (C::CompactCtorDef, make::<MethodDefHandler>),
        TokenKind::ClassDef => (C::ClassDef, make::<ClassDefHandler>),
        TokenKind::InterfaceDef => (C::InterfaceDef, make::<ClassDefHandler>),
        TokenKind::EnumDef => (C::EnumDef, make::<ClassDefHandler>),
        TokenKind::AnnotationDef => (C::AnnotationDef, make::<ClassDefHandler>),
        TokenKind::RecordDef => (C::RecordDef, make::<ClassDefHandler>),
        TokenKind::Objblock => (C::ObjectBlock, make::<ObjectBlockHandler>),
        TokenKind::Import => (C::Import, make::<ImportHandler>),
        TokenKind::ArrayInit => (C::ArrayInit, array_init),
        TokenKind::AnnotationArrayInit => (C::AnnotationArrayInit, annotation_array_init),
        TokenKind::MethodCall => (C::MethodCall, make::<MethodCallHandler>),
        TokenKind::CtorCall => (C::CtorCall, make::<MethodCallHandler>),
        TokenKind::SuperCtorCall => (C::SuperCtorCall, make::<MethodCallHandler>),
        TokenKind::LabeledStat => (C::Label, make::<LabelHandler>),
        TokenKind::StaticInit => (C::StaticInit, make::<StaticInitHandler>),
        TokenKind::VariableDef => (C::MemberDef, make::<MemberDefHandler>),
        TokenKind::LiteralNew => (C::New, make::<NewHandler>),
        TokenKind::IndexOp => (C::IndexOp, make::<IndexOpHandler>),
        TokenKind::LiteralSynchronized => (C::Synchronized, make::<SynchronizedHandler>),
        TokenKind::Lambda => (C::Lambda, make::<LambdaHandler>),
        TokenKind::SwitchRule => (C::SwitchRule, make::<SwitchRuleHandler>),
        TokenKind::LiteralYield => (C::Yield, make::<YieldHandler>),
        _ => return None,
    };
    Some(entry)
}

/// Whether the structural engine has a handler for `kind`.
#[must_use]
pub fn is_handled_kind(kind: TokenKind) -> bool {
    registration(kind).is_some()
}

/// Creates handlers on demand and remembers them for the rest of the pass.
#[derive(Debug, Default)]
pub struct HandlerFactory {
    created: HashMap<NodeId, HandlerId>,
}

impl HandlerFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every node kind with a registered handler, in declaration order.
    #[must_use]
    pub fn handled_kinds() -> Vec<TokenKind> {
        TokenKind::ALL
            .iter()
            .copied()
            .filter(|&kind| is_handled_kind(kind))
            .collect()
    }

    /// Handler of `node`, creating it under `parent` on first request.
    ///
    /// # Errors
    ///
    /// `IndentationError::InvalidArgument` when `node` has no registered handler.
    pub(crate) fn get_handler<'t>(
        &mut self,
        cx: &mut Cx<'t>,
        node: Node<'t>,
        parent: HandlerId,
    ) -> Result<HandlerId, IndentationError> {
        if let Some(&id) = self.created.get(&node.id()) {
            return Ok(id);
        }
        let parent = if node.is(TokenKind::MethodCall) {
            self.chain_parent(cx, node, parent)?
        } else {
            parent
        };
        let (construct, constructor) =
            registration(node.kind()).ok_or_else(|| IndentationError::unhandled(node.kind()))?;
        let id = cx.push(constructor(), construct, node, Some(parent));
        trace!(kind = %node.kind(), line = node.line(), construct = construct.label(), "created handler");
        self.created.insert(node.id(), id);
        Ok(id)
    }

    /// In `a.b().c()` the inner call owns the outer one, so it is created first.
    fn chain_parent<'t>(
        &mut self,
        cx: &mut Cx<'t>,
        call: Node<'t>,
        parent: HandlerId,
    ) -> Result<HandlerId, IndentationError> {
        let mut target = call.first_child();
        while let Some(dot) = target.filter(|node| node.is(TokenKind::Dot)) {
            target = dot.first_child();
        }
        match target {
            Some(target) if is_handled_kind(target.kind()) => self.get_handler(cx, target, parent),
            _ => Ok(parent),
        }
    }

    /// Forget the handlers of the finished pass. The registry is static.
    pub fn clear(&mut self) {
        self.created.clear();
    }

    #[must_use]
    pub fn created_count(&self) -> usize {
        self.created.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_every_construct_family() {
        let kinds = HandlerFactory::handled_kinds();
        assert_eq!(kinds.len(), 38);
        for kind in [
            TokenKind::Slist,
            TokenKind::InstanceInit,
            TokenKind::CompactCtorDef,
            TokenKind::LiteralYield,
            TokenKind::AnnotationArrayInit,
        ] {
            assert!(kinds.contains(&kind), "{kind} should be handled");
        }
        assert!(!is_handled_kind(TokenKind::Ident));
        assert!(!is_handled_kind(TokenKind::Expr));
    }

    #[test]
    fn unhandled_kind_names_the_token() {
        let err = IndentationError::unhandled(TokenKind::Ident);
        assert_eq!(err.to_string(), "unhandled node kind: IDENT");
    }
}
