use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(long = "spec", value_name = "OPENAPI_JSON", help = "Path to the OpenAPI document")]
    pub spec: PathBuf,
    #[arg(
        long = "out",
        value_name = "RUST_FILE",
        help = "Where to write the generated module. Defaults to stdout"
    )]
    pub out: Option<PathBuf>,
}

pub fn run(args: GenerateArgs) -> i32 {
    match generate(&args.spec, args.out.as_deref()) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn generate(spec: &Path, out: Option<&Path>) -> Result<(), String> {
    let json = fs::read_to_string(spec)
        .map_err(|e| format!("Failed to read {}: {e}", spec.display()))?;
    let code = apibind_codegen::generate(&json)
        .map_err(|e| format!("Failed to generate bindings from {}: {e}", spec.display()))?;

    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
            }
            fs::write(path, &code).map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
            info!(path = %path.display(), bytes = code.len(), "Wrote generated bindings.");
        }
        None => print!("{code}"),
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SPEC: &str = r##"{
        "paths": {
            "/App/FirstParty/": {
                "summary": "App.GetApplicationApiUsage",
                "get": { "responses": { "200": { "$ref": "#/components/responses/int32" } } }
            }
        },
        "components": {
            "responses": {
                "int32": { "content": { "application/json": { "schema": {
                    "type": "object", "properties": { "Response": { "type": "integer", "format": "int32" } }
                } } } }
            }
        }
    }"##;

    #[test]
    fn test_generate_writes_module() {
        let dir = TempDir::new().unwrap();
        let spec = dir.path().join("openapi.json");
        let out = dir.path().join("generated/bindings.rs");
        fs::write(&spec, SPEC).unwrap();

        generate(&spec, Some(&out)).unwrap();

        let code = fs::read_to_string(&out).unwrap();
        assert!(code.contains("pub async fn app_get_application_api_usage("));
    }

    #[test]
    fn test_generate_reports_schema_errors() {
        let dir = TempDir::new().unwrap();
        let spec = dir.path().join("openapi.json");
        fs::write(&spec, r#"{"paths":{"/X/":{"summary":"X"}}}"#).unwrap();

        let err = generate(&spec, Some(&dir.path().join("out.rs"))).unwrap_err();
        assert!(err.contains("neither a GET nor a POST"));
        assert!(!dir.path().join("out.rs").exists());
    }
}
