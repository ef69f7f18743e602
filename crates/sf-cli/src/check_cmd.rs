use std::path::Path;

use crate::shared::load_template;

pub fn run(template: &Path) -> Result<(), i32> {
    let template = load_template(template)?;
    let issues = template.validate();

    if issues.is_empty() {
        println!(
            "No issues found ({} pages, {} fields).",
            template.pages.len(),
            template.field_count()
        );
        return Ok(());
    }
    for issue in &issues {
        println!("[ERROR] {issue}");
    }
    println!();
    println!("Summary: {} issue(s)", issues.len());
    Err(1)
}
