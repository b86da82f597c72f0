//! Per-kind child layout rules.
//!
//! A layout check only looks at a node's own data and the kinds of its direct
//! children, so mutation primitives can validate a prospective change before
//! committing it.

use crate::error::StructuralError;
use crate::names::is_valid_identifier;
use crate::node::{CallArgs, Category, NodeId, NodeKind};

type Result<T> = std::result::Result<T, StructuralError>;

/// Checks that `children` is a valid child list for a node of `kind`.
pub(crate) fn check_layout<'a, F>(kind: &NodeKind, children: &[NodeId], kind_of: F) -> Result<()>
where
    F: Fn(NodeId) -> &'a NodeKind,
{
    check_names(kind)?;

    let name = kind.name();
    let expect = |id: NodeId, expected: Category, what: &str| -> Result<()> {
        let found = kind_of(id);
        if found.category() == expected {
            Ok(())
        } else {
            Err(StructuralError::layout(
                name,
                format!("{what} must be a {}, found {}", expected.name(), found.name()),
            ))
        }
    };
    let count = |min: usize, max: usize| -> Result<()> {
        if children.len() < min || children.len() > max {
            let expected = if min == max {
                format!("{min}")
            } else if max == usize::MAX {
                format!("at least {min}")
            } else {
                format!("{min} to {max}")
            };
            return Err(StructuralError::layout(
                name,
                format!("expected {expected} children, found {}", children.len()),
            ));
        }
        Ok(())
    };
    let prefix = |id: NodeId, what: &str| -> Result<()> {
        let found = kind_of(id);
        if found.is_prefix_expression() {
            Ok(())
        } else {
            Err(StructuralError::layout(
                name,
                format!("{what} must be a prefix expression, found {}", found.name()),
            ))
        }
    };
    let assignable = |id: NodeId| -> Result<()> {
        let found = kind_of(id);
        if found.is_assignable() {
            Ok(())
        } else {
            Err(StructuralError::layout(
                name,
                format!("cannot assign to {}", found.name()),
            ))
        }
    };

    match kind {
        NodeKind::Block => {
            for (i, &child) in children.iter().enumerate() {
                expect(child, Category::Statement, "block item")?;
                if matches!(kind_of(child), NodeKind::Return) && i + 1 != children.len() {
                    return Err(StructuralError::layout(
                        name,
                        "return must be the last statement of a block",
                    ));
                }
            }
        }
        NodeKind::LocalAssign { names } => {
            if names.is_empty() {
                return Err(StructuralError::layout(name, "declares no names"));
            }
            for &child in children {
                expect(child, Category::Expression, "value")?;
            }
        }
        NodeKind::Assign { targets } => {
            if *targets == 0 {
                return Err(StructuralError::layout(name, "has no targets"));
            }
            count(targets + 1, usize::MAX)?;
            for &target in &children[..*targets] {
                assignable(target)?;
            }
            for &value in &children[*targets..] {
                expect(value, Category::Expression, "value")?;
            }
        }
        NodeKind::CompoundAssign { .. } => {
            count(2, 2)?;
            assignable(children[0])?;
            expect(children[1], Category::Expression, "value")?;
        }
        NodeKind::CallStatement => {
            count(1, 1)?;
            if !kind_of(children[0]).is_call() {
                return Err(StructuralError::layout(
                    name,
                    format!("{} is not a call", kind_of(children[0]).name()),
                ));
            }
        }
        NodeKind::Do => {
            count(1, 1)?;
            expect(children[0], Category::Block, "body")?;
        }
        NodeKind::While => {
            count(2, 2)?;
            expect(children[0], Category::Expression, "condition")?;
            expect(children[1], Category::Block, "body")?;
        }
        NodeKind::Repeat => {
            count(2, 2)?;
            expect(children[0], Category::Block, "body")?;
            expect(children[1], Category::Expression, "condition")?;
        }
        NodeKind::If => {
            count(2, usize::MAX)?;
            let pairs = children.len() / 2;
            for pair in 0..pairs {
                expect(children[pair * 2], Category::Expression, "condition")?;
                expect(children[pair * 2 + 1], Category::Block, "branch")?;
            }
            if children.len() % 2 == 1 {
                expect(children[children.len() - 1], Category::Block, "else branch")?;
            }
        }
        NodeKind::NumericFor { .. } => {
            count(3, 4)?;
            let (block, bounds) = children.split_last().ok_or_else(|| {
                StructuralError::layout(name, "missing body")
            })?;
            for &bound in bounds {
                expect(bound, Category::Expression, "loop bound")?;
            }
            expect(*block, Category::Block, "body")?;
        }
        NodeKind::GenericFor { names } => {
            if names.is_empty() {
                return Err(StructuralError::layout(name, "declares no names"));
            }
            count(2, usize::MAX)?;
            let (block, exprs) = children.split_last().ok_or_else(|| {
                StructuralError::layout(name, "missing body")
            })?;
            for &expr in exprs {
                expect(expr, Category::Expression, "iterator expression")?;
            }
            expect(*block, Category::Block, "body")?;
        }
        NodeKind::FunctionDeclaration { .. } | NodeKind::LocalFunction { .. } | NodeKind::Function => {
            count(1, 1)?;
            expect(children[0], Category::FunctionBody, "body")?;
        }
        NodeKind::Goto { .. }
        | NodeKind::Label { .. }
        | NodeKind::Break
        | NodeKind::Continue
        | NodeKind::Nil
        | NodeKind::True
        | NodeKind::False
        | NodeKind::VarArgs
        | NodeKind::Number(_)
        | NodeKind::String(_)
        | NodeKind::Identifier(_) => count(0, 0)?,
        NodeKind::Return => {
            for &child in children {
                expect(child, Category::Expression, "returned value")?;
            }
        }
        NodeKind::Field { .. } => {
            count(1, 1)?;
            prefix(children[0], "indexed value")?;
        }
        NodeKind::Index => {
            count(2, 2)?;
            prefix(children[0], "indexed value")?;
            expect(children[1], Category::Expression, "key")?;
        }
        NodeKind::Call { args } | NodeKind::MethodCall { args, .. } => {
            count(1, usize::MAX)?;
            prefix(children[0], "callee")?;
            for &arg in &children[1..] {
                expect(arg, Category::Expression, "argument")?;
            }
            match args {
                CallArgs::Parenthesized => {}
                CallArgs::String => {
                    if children.len() != 2 || !matches!(kind_of(children[1]), NodeKind::String(_)) {
                        return Err(StructuralError::layout(
                            name,
                            "string call syntax needs exactly one string argument",
                        ));
                    }
                }
                CallArgs::Table => {
                    if children.len() != 2 || !matches!(kind_of(children[1]), NodeKind::Table) {
                        return Err(StructuralError::layout(
                            name,
                            "table call syntax needs exactly one table argument",
                        ));
                    }
                }
            }
        }
        NodeKind::Binary { .. } => {
            count(2, 2)?;
            expect(children[0], Category::Expression, "left operand")?;
            expect(children[1], Category::Expression, "right operand")?;
        }
        NodeKind::Unary { .. } | NodeKind::Paren => {
            count(1, 1)?;
            expect(children[0], Category::Expression, "operand")?;
        }
        NodeKind::Table => {
            for &child in children {
                expect(child, Category::TableEntry, "entry")?;
            }
        }
        NodeKind::IfExpression => {
            count(3, usize::MAX)?;
            if children.len() % 2 == 0 {
                return Err(StructuralError::layout(name, "missing else value"));
            }
            for &child in children {
                expect(child, Category::Expression, "branch")?;
            }
        }
        NodeKind::TableValue | NodeKind::TableField { .. } => {
            count(1, 1)?;
            expect(children[0], Category::Expression, "value")?;
        }
        NodeKind::TableIndex => {
            count(2, 2)?;
            expect(children[0], Category::Expression, "key")?;
            expect(children[1], Category::Expression, "value")?;
        }
        NodeKind::FunctionBody { .. } => {
            count(1, 1)?;
            expect(children[0], Category::Block, "body")?;
        }
    }

    Ok(())
}

fn check_names(kind: &NodeKind) -> Result<()> {
    let valid = |name: &str| -> Result<()> {
        if is_valid_identifier(name) {
            Ok(())
        } else {
            Err(StructuralError::InvalidName(name.to_string()))
        }
    };

    match kind {
        NodeKind::Identifier(name)
        | NodeKind::Field { name }
        | NodeKind::MethodCall { method: name, .. }
        | NodeKind::NumericFor { var: name }
        | NodeKind::LocalFunction { name }
        | NodeKind::Goto { label: name }
        | NodeKind::Label { name }
        | NodeKind::TableField { name } => valid(name),
        NodeKind::LocalAssign { names } => names.iter().try_for_each(|local| valid(&local.name)),
        NodeKind::GenericFor { names } => names.iter().try_for_each(|name| valid(name)),
        NodeKind::FunctionDeclaration { name } => {
            valid(&name.base)?;
            name.fields.iter().try_for_each(|field| valid(field))?;
            name.method.as_deref().map_or(Ok(()), valid)
        }
        NodeKind::FunctionBody { params, .. } => params.iter().try_for_each(|param| valid(param)),
        _ => Ok(()),
    }
}
