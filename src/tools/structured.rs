//! Structured-data tools: read/write/set a single value in JSON, YAML, and
//! INI files, addressed by a dotted key path (`a.b.c`).

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::Result;
use crate::graph::state::{TaskType, ToolContext, ToolSideEffect};

use super::filesystem::FsContext;
use super::traits::{Tool, ToolMetadata, ToolResult};

#[derive(Deserialize)]
struct PathArgs {
    path: String,
}

#[derive(Deserialize)]
struct SetValueArgs {
    path: String,
    key: String,
    value: Value,
}

fn dotted_set(value: &mut Value, key: &str, new_value: Value) {
    let segments: Vec<&str> = key.split('.').collect();
    let mut current = value;
    for segment in &segments[..segments.len().saturating_sub(1)] {
        if !current.is_object() {
            *current = json!({});
        }
        current = current.as_object_mut().unwrap().entry(segment.to_string()).or_insert_with(|| json!({}));
    }
    if let Some(last) = segments.last() {
        if !current.is_object() {
            *current = json!({});
        }
        current.as_object_mut().unwrap().insert(last.to_string(), new_value);
    }
}

pub struct ReadJsonTool(pub FsContext);

#[async_trait]
impl Tool for ReadJsonTool {
    fn name(&self) -> &str {
        "read_json"
    }
    fn description(&self) -> &str {
        "Parse a workspace JSON file and return it"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"path": {"type": "string"}}, "required": ["path"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new().with_scenarios([TaskType::FileOperation]).with_contexts([ToolContext::Filesystem])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: PathArgs = serde_json::from_value(args).map_err(|e| crate::Error::InvalidInput(e.to_string()))?;
        let resolved = self.0.resolve(&args.path)?;
        let content = tokio::fs::read_to_string(&resolved).await?;
        let value: Value = serde_json::from_str(&content).map_err(|e| crate::Error::InvalidInput(e.to_string()))?;
        Ok(ToolResult::success(value.to_string()))
    }
}

pub struct WriteJsonTool(pub FsContext);

#[async_trait]
impl Tool for WriteJsonTool {
    fn name(&self) -> &str {
        "write_json"
    }
    fn description(&self) -> &str {
        "Write a JSON value to a workspace file"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"path": {"type": "string"}, "value": {}}, "required": ["path", "value"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new()
            .with_scenarios([TaskType::FileOperation])
            .with_side_effects([ToolSideEffect::FileMutation])
            .with_contexts([ToolContext::Filesystem])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        #[derive(Deserialize)]
        struct Args {
            path: String,
            value: Value,
        }
        let args: Args = serde_json::from_value(args).map_err(|e| crate::Error::InvalidInput(e.to_string()))?;
        let resolved = self.0.resolve(&args.path)?;
        let pretty = serde_json::to_string_pretty(&args.value).map_err(|e| crate::Error::InvalidInput(e.to_string()))?;
        tokio::fs::write(&resolved, pretty).await?;
        Ok(ToolResult::success(format!("wrote json to {}", args.path)))
    }
}

pub struct SetJsonValueTool(pub FsContext);

#[async_trait]
impl Tool for SetJsonValueTool {
    fn name(&self) -> &str {
        "set_json_value"
    }
    fn description(&self) -> &str {
        "Set a dotted key path inside an existing JSON file"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"path": {"type": "string"}, "key": {"type": "string"}, "value": {}}, "required": ["path", "key", "value"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new()
            .with_scenarios([TaskType::FileOperation, TaskType::CodeFix])
            .with_side_effects([ToolSideEffect::FileMutation])
            .with_contexts([ToolContext::Filesystem])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: SetValueArgs = serde_json::from_value(args).map_err(|e| crate::Error::InvalidInput(e.to_string()))?;
        let resolved = self.0.resolve(&args.path)?;
        let content = tokio::fs::read_to_string(&resolved).await?;
        let mut root: Value = serde_json::from_str(&content).map_err(|e| crate::Error::InvalidInput(e.to_string()))?;
        dotted_set(&mut root, &args.key, args.value);
        let pretty = serde_json::to_string_pretty(&root).map_err(|e| crate::Error::InvalidInput(e.to_string()))?;
        tokio::fs::write(&resolved, pretty).await?;
        Ok(ToolResult::success(format!("set {} in {}", args.key, args.path)))
    }
}

pub struct ReadYamlTool(pub FsContext);

#[async_trait]
impl Tool for ReadYamlTool {
    fn name(&self) -> &str {
        "read_yaml"
    }
    fn description(&self) -> &str {
        "Parse a workspace YAML file and return it as JSON"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"path": {"type": "string"}}, "required": ["path"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new().with_scenarios([TaskType::FileOperation]).with_contexts([ToolContext::Filesystem])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: PathArgs = serde_json::from_value(args).map_err(|e| crate::Error::InvalidInput(e.to_string()))?;
        let resolved = self.0.resolve(&args.path)?;
        let content = tokio::fs::read_to_string(&resolved).await?;
        let value: Value = serde_yaml::from_str(&content).map_err(|e| crate::Error::InvalidInput(e.to_string()))?;
        Ok(ToolResult::success(value.to_string()))
    }
}

pub struct WriteYamlTool(pub FsContext);

#[async_trait]
impl Tool for WriteYamlTool {
    fn name(&self) -> &str {
        "write_yaml"
    }
    fn description(&self) -> &str {
        "Write a JSON value to a workspace file as YAML"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"path": {"type": "string"}, "value": {}}, "required": ["path", "value"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new()
            .with_scenarios([TaskType::FileOperation])
            .with_side_effects([ToolSideEffect::FileMutation])
            .with_contexts([ToolContext::Filesystem])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        #[derive(Deserialize)]
        struct Args {
            path: String,
            value: Value,
        }
        let args: Args = serde_json::from_value(args).map_err(|e| crate::Error::InvalidInput(e.to_string()))?;
        let resolved = self.0.resolve(&args.path)?;
        let rendered = serde_yaml::to_string(&args.value).map_err(|e| crate::Error::InvalidInput(e.to_string()))?;
        tokio::fs::write(&resolved, rendered).await?;
        Ok(ToolResult::success(format!("wrote yaml to {}", args.path)))
    }
}

pub struct SetYamlValueTool(pub FsContext);

#[async_trait]
impl Tool for SetYamlValueTool {
    fn name(&self) -> &str {
        "set_yaml_value"
    }
    fn description(&self) -> &str {
        "Set a dotted key path inside an existing YAML file"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"path": {"type": "string"}, "key": {"type": "string"}, "value": {}}, "required": ["path", "key", "value"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new()
            .with_scenarios([TaskType::FileOperation, TaskType::CodeFix])
            .with_side_effects([ToolSideEffect::FileMutation])
            .with_contexts([ToolContext::Filesystem])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: SetValueArgs = serde_json::from_value(args).map_err(|e| crate::Error::InvalidInput(e.to_string()))?;
        let resolved = self.0.resolve(&args.path)?;
        let content = tokio::fs::read_to_string(&resolved).await?;
        let mut root: Value = serde_yaml::from_str(&content).map_err(|e| crate::Error::InvalidInput(e.to_string()))?;
        dotted_set(&mut root, &args.key, args.value);
        let rendered = serde_yaml::to_string(&root).map_err(|e| crate::Error::InvalidInput(e.to_string()))?;
        tokio::fs::write(&resolved, rendered).await?;
        Ok(ToolResult::success(format!("set {} in {}", args.key, args.path)))
    }
}

/// Minimal `section / key = value` INI parser; no registry crate covers this
/// format, so round-tripping is hand-rolled rather than borrowed.
fn parse_ini(content: &str) -> Value {
    let mut root = json!({});
    let mut section = String::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            section = line[1..line.len() - 1].to_string();
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim();
            let full_key = if section.is_empty() { key.to_string() } else { format!("{}.{}", section, key) };
            dotted_set(&mut root, &full_key, json!(value));
        }
    }
    root
}

fn render_ini(value: &Value) -> String {
    let mut out = String::new();
    if let Some(obj) = value.as_object() {
        let mut top_level = String::new();
        for (key, val) in obj {
            if let Some(section) = val.as_object() {
                out.push_str(&format!("[{}]\n", key));
                for (k, v) in section {
                    out.push_str(&format!("{} = {}\n", k, scalar_to_str(v)));
                }
                out.push('\n');
            } else {
                top_level.push_str(&format!("{} = {}\n", key, scalar_to_str(val)));
            }
        }
        out = format!("{}{}", top_level, out);
    }
    out
}

fn scalar_to_str(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub struct ReadIniTool(pub FsContext);

#[async_trait]
impl Tool for ReadIniTool {
    fn name(&self) -> &str {
        "read_ini"
    }
    fn description(&self) -> &str {
        "Parse a workspace INI file and return it as JSON"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"path": {"type": "string"}}, "required": ["path"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new().with_scenarios([TaskType::FileOperation]).with_contexts([ToolContext::Filesystem])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: PathArgs = serde_json::from_value(args).map_err(|e| crate::Error::InvalidInput(e.to_string()))?;
        let resolved = self.0.resolve(&args.path)?;
        let content = tokio::fs::read_to_string(&resolved).await?;
        Ok(ToolResult::success(parse_ini(&content).to_string()))
    }
}

pub struct WriteIniTool(pub FsContext);

#[async_trait]
impl Tool for WriteIniTool {
    fn name(&self) -> &str {
        "write_ini"
    }
    fn description(&self) -> &str {
        "Write a JSON object to a workspace file as INI"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"path": {"type": "string"}, "value": {}}, "required": ["path", "value"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new()
            .with_scenarios([TaskType::FileOperation])
            .with_side_effects([ToolSideEffect::FileMutation])
            .with_contexts([ToolContext::Filesystem])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        #[derive(Deserialize)]
        struct Args {
            path: String,
            value: Value,
        }
        let args: Args = serde_json::from_value(args).map_err(|e| crate::Error::InvalidInput(e.to_string()))?;
        let resolved = self.0.resolve(&args.path)?;
        tokio::fs::write(&resolved, render_ini(&args.value)).await?;
        Ok(ToolResult::success(format!("wrote ini to {}", args.path)))
    }
}

pub struct SetIniValueTool(pub FsContext);

#[async_trait]
impl Tool for SetIniValueTool {
    fn name(&self) -> &str {
        "set_ini_value"
    }
    fn description(&self) -> &str {
        "Set a `section.key` value inside an existing INI file"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"path": {"type": "string"}, "key": {"type": "string"}, "value": {}}, "required": ["path", "key", "value"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new()
            .with_scenarios([TaskType::FileOperation, TaskType::CodeFix])
            .with_side_effects([ToolSideEffect::FileMutation])
            .with_contexts([ToolContext::Filesystem])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: SetValueArgs = serde_json::from_value(args).map_err(|e| crate::Error::InvalidInput(e.to_string()))?;
        let resolved = self.0.resolve(&args.path)?;
        let content = tokio::fs::read_to_string(&resolved).await?;
        let mut root = parse_ini(&content);
        dotted_set(&mut root, &args.key, args.value);
        tokio::fs::write(&resolved, render_ini(&root)).await?;
        Ok(ToolResult::success(format!("set {} in {}", args.key, args.path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_set() {
        let mut root = json!({"a": {"b": 1}});
        dotted_set(&mut root, "a.c", json!(2));
        assert_eq!(root["a"]["c"], json!(2));
    }

    #[test]
    fn test_ini_round_trip() {
        let ini = "[server]\nhost = localhost\nport = 8080\n";
        let parsed = parse_ini(ini);
        assert_eq!(parsed["server"]["host"], json!("localhost"));
        let rendered = render_ini(&parsed);
        assert!(rendered.contains("[server]"));
        assert!(rendered.contains("host = localhost"));
    }
}
