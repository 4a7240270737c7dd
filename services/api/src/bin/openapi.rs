//! services/api/src/bin/openapi.rs
//!
//! Writes the catalog API's OpenAPI document as pretty JSON, to the path
//! given as the first argument or to `openapi.json`.

use api_lib::web::ApiDoc;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
    let document = ApiDoc::openapi().to_pretty_json()?;
    std::fs::write(&output, document)?;
    println!("Wrote OpenAPI document to {}", output);
    Ok(())
}
