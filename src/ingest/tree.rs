//! Tree-art lines describing the sites and logs being ingested.

/// Label of the tree root.
const ROOT_LABEL: &str = "├── unidade";

pub fn root_line() -> String {
    ROOT_LABEL.to_string()
}

pub fn site_line(site: &str, last_site: bool) -> String {
    let branch = if last_site { "└──" } else { "├──" };
    format!(
        "|     {} <span style=\"color: #1da5c2\">{}</span>",
        branch, site
    )
}

pub fn log_line(log: &str, last_log: bool, last_site: bool) -> String {
    let branch = if last_log { "└──" } else { "├──" };
    let indent = if last_site { "|           " } else { "|     |     " };
    format!(
        "{}{} <span style=\"color: #77767c\">{}</span>",
        indent, branch, log
    )
}
