//! `try` and `can`, which receive their arguments unevaluated so that errors can be caught

use cel_interpreter::{Context, ExecutionError, FunctionContext, Value};

pub fn install(context: &mut Context<'_>) {
    context.add_function("try", try_each);
    context.add_function("can", can);
}

/// The value of the first argument that evaluates without an error.
fn try_each(ftx: &FunctionContext) -> Result<Value, ExecutionError> {
    let mut last_error = None;
    for arg in &ftx.args {
        match Value::resolve(arg, ftx.ptx) {
            Ok(value) => return Ok(value),
            Err(e) => last_error = Some(e),
        }
    }

    Err(match last_error {
        Some(e) => ftx.error(format!("no expression succeeded, last error: {e}")),
        None => ftx.error("expected at least 1 argument, got 0"),
    })
}

/// Whether the single argument evaluates without an error.
fn can(ftx: &FunctionContext) -> Result<Value, ExecutionError> {
    match ftx.args.as_slice() {
        [arg] => Ok(Value::Bool(Value::resolve(arg, ftx.ptx).is_ok())),
        args => Err(ftx.error(format!("expected 1 argument, got {}", args.len()))),
    }
}
