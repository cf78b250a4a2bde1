use super::Expr;

/// Determines whether `function` is called anywhere within `expr`.
///
/// Every structurally present child of a node is searched and the walk stops at
/// the first matching call. Arguments of a call are searched even when the call
/// itself is not the one being looked for, since calls nest (`upper(file(path))`).
/// Literals and variable references never match.
#[must_use]
pub fn contains_call(expr: &Expr, function: &str) -> bool {
    let found = |child: &Expr| contains_call(child, function);
    let found_opt = |child: &Option<Box<Expr>>| child.as_deref().is_some_and(found);

    match expr {
        Expr::FunctionCall { name, args } => name == function || args.iter().any(found),
        Expr::Template { parts } => parts.iter().any(found),
        Expr::TemplateWrap { wrapped } => found(wrapped),
        Expr::Conditional {
            condition,
            true_result,
            false_result,
        } => found(condition) || found(true_result) || found(false_result),
        Expr::BinaryOp { lhs, rhs, .. } => found(lhs) || found(rhs),
        Expr::UnaryOp { operand, .. } => found(operand),
        Expr::Parentheses { inner } => found(inner),
        Expr::Index { collection, key } => found(collection) || found(key),
        Expr::RelativeTraversal { source, .. } => found(source),
        Expr::Splat { source, each } => found(source) || found_opt(each),
        Expr::For {
            collection,
            key,
            value,
            condition,
            ..
        } => found(collection) || found_opt(key) || found_opt(value) || found_opt(condition),
        Expr::Object { items } => items.iter().any(|item| found(&item.key) || found(&item.value)),
        Expr::Tuple { elements } => elements.iter().any(found),
        Expr::Literal { .. } | Expr::ScopeTraversal { .. } => false,
    }
}
