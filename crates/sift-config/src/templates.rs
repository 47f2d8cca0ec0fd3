//! Configuration template for `sift init`.
//!
//! The template is stored as a valid TOML file and returned as a commented-out example.

/// Configuration template (valid TOML).
const CONFIG_TEMPLATE: &str = include_str!("../templates/config.toml");

/// Returns the configuration template as a commented-out example.
pub fn config_template() -> String {
    comment_template(CONFIG_TEMPLATE)
}

/// Converts a valid TOML template into a commented-out example config.
///
/// Comment lines and empty lines are preserved; every other line gets a "# " prefix.
fn comment_template(template: &str) -> String {
    let mut result = String::with_capacity(template.len() + template.lines().count() * 2);
    for line in template.lines() {
        if !line.is_empty() && !line.starts_with('#') {
            result.push_str("# ");
        }
        result.push_str(line);
        result.push('\n');
    }
    result
}
