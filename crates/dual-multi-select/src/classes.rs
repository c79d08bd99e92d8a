//! Class names making up the rendered markup contract.

pub const CONTAINER: &str = "dms-container";
pub const STACK_LISTS: &str = "dms-stackLists";
pub const STICKY_HEADERS: &str = "dms-stickyHeaders";
pub const SELECTABLE: &str = "dms-selectable";
pub const SELECTED: &str = "dms-selected";
pub const ARROWS: &str = "dms-arrows";
pub const LIST: &str = "dms-list";
pub const OPTION: &str = "dms-option";
pub const OPT_GROUP: &str = "dms-optGroup";
pub const OPT_GROUP_LABEL: &str = "dms-optGroupLabel";
pub const DISABLED: &str = "dms-disabled";
pub const HEADER: &str = "dms-header";
pub const SEARCH: &str = "dms-search";
