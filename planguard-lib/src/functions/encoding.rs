use super::{Args, FunctionTable};
use crate::expr::value::{from_json, string_value, to_json};
use ohno::app_err;

pub fn register(table: &mut FunctionTable) {
    table.register("jsondecode", |_, args| {
        let text = Args::exact(args, 1)?.string(0)?;
        let json: serde_json::Value = serde_json::from_str(text).map_err(|e| app_err!("invalid JSON: {e}"))?;
        Ok(from_json(&json))
    });

    table.register("jsonencode", |_, args| {
        let json = to_json(Args::exact(args, 1)?.value(0)?)?;
        let text = serde_json::to_string(&json).map_err(|e| app_err!("encoding JSON: {e}"))?;
        Ok(string_value(text))
    });

    table.register("yamldecode", |_, args| {
        let text = Args::exact(args, 1)?.string(0)?;
        let json: serde_json::Value = serde_yaml::from_str(text).map_err(|e| app_err!("invalid YAML: {e}"))?;
        Ok(from_json(&json))
    });

    table.register("yamlencode", |_, args| {
        let json = to_json(Args::exact(args, 1)?.value(0)?)?;
        let text = serde_yaml::to_string(&json).map_err(|e| app_err!("encoding YAML: {e}"))?;
        Ok(string_value(text))
    });
}
