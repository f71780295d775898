use indicatif::ProgressStyle;

const ONLY_MESSAGE_TEMPLATE: &str = "{spinner} {wide_msg}";
const MEMBERS_TEMPLATE: &str = "{spinner} {msg:30} {wide_bar:} {pos:>3}/{len:3} members";

pub struct ProgressStyleTemplate;

impl ProgressStyleTemplate {
    pub fn only_message() -> ProgressStyle {
        ProgressStyle::with_template(ONLY_MESSAGE_TEMPLATE).unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    pub fn members_bar() -> ProgressStyle {
        ProgressStyle::with_template(MEMBERS_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
    }
}
