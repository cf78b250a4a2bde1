use super::{Args, FunctionTable};
use cel_interpreter::Value;

pub fn register(table: &mut FunctionTable) {
    // false outside of a resource scope rather than an error
    table.register("contains_function_call", |scope, args| {
        let name = Args::exact(args, 1)?.string(0)?;
        Ok(Value::Bool(scope.resource().is_some_and(|r| r.contains_call(name))))
    });
}
