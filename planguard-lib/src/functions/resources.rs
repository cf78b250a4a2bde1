use super::{Args, FunctionTable};
use crate::expr::value::{list_value, resource_to_value};
use crate::index::ResourceIndex;
use crate::model::Resource;
use cel_interpreter::Value;
use std::sync::Arc;

pub fn register(table: &mut FunctionTable, index: &Arc<ResourceIndex>) {
    let by_type = Arc::clone(index);
    table.register("resources", move |_, args| {
        let pattern = Args::exact(args, 1)?.string(0)?;
        Ok(to_list(&by_type.by_type_pattern(pattern)))
    });

    let by_file = Arc::clone(index);
    table.register("resources_in_file", move |_, args| {
        let path = Args::exact(args, 1)?.string(0)?;
        Ok(to_list(by_file.by_file(path)))
    });
}

fn to_list(resources: &[Arc<Resource>]) -> Value {
    list_value(resources.iter().map(|r| resource_to_value(r)).collect())
}
