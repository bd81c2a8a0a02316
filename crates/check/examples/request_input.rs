//! Filter a request-shaped input tree and print the coerced value and errors.
//!
//! Run with `SIFT_LOG=sift_check=trace` to watch each filter being applied.

use serde_json::json;
use sift_check::prelude::*;
use sift_check::{CheckConfig, RuleError};
use tracing::{info, warn};

fn search_rule() -> Result<Rule, RuleError> {
    Ok(Rule::arrays([
        ("q", Rule::string().trim().strip_tags(["b", "i"]).max(100)),
        ("page", Rule::int().min(1).required().default(1)),
        ("per_page", Rule::int().min(1).max(50).ignore(["max"]).default(20)),
        ("sort", Rule::string().lowercase().one_of(["title", "year", "rating"])),
        ("color", Rule::string().color()),
        ("site", Rule::string().url()),
        ("files", Rule::arrays_of(Rule::string().ospatterns(["*.pdf", "*.txt"])?)),
        ("ref", Rule::string().regexp([r"^[A-Z]{2}-\d{4}$"])?),
        ("token", Rule::string().forbidden()),
        (
            "author",
            Rule::arrays([
                ("email", Rule::string().email().required()),
                ("age", Rule::any([Rule::int().min(0), Rule::null()])),
            ]),
        ),
    ]))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    sift_log::auto_init()?;

    let checker = Checker::builder()
        .config(CheckConfig::from_env()?)
        .build();
    let rule = search_rule()?;

    let input = json!({
        "q": "  <b>rust</b> <script>x</script> ",
        "per_page": "500",
        "sort": "Rating",
        "color": "f0a",
        "site": "https://example.com",
        "files": ["notes.txt", "setup.exe"],
        "ref": "AB-1234",
        "token": "secret",
        "author": {"email": "ann@example", "age": "n/a"},
        "tracking": "dropped"
    });

    let out = checker.check(input, &rule);
    info!(value = %out.value.to_json(), "filtered request");

    match &out.error {
        None => info!("request is valid"),
        Some(error) => {
            for (path, leaf) in error.leaves() {
                warn!(
                    path = %path,
                    code = leaf.code().unwrap_or("invalid"),
                    detail = %leaf.message().unwrap_or_default(),
                    "invalid field"
                );
            }
            println!("{}", serde_json::to_string_pretty(&error.to_json())?);
        }
    }
    println!("{}", serde_json::to_string_pretty(&out.value.to_json())?);
    Ok(())
}
