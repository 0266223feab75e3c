pub(crate) mod blocklist;
pub(crate) mod controls;
pub(crate) mod proxy_table;
pub(crate) mod scheduler_info;
pub(crate) mod toast;
