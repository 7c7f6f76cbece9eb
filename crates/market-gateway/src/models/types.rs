use std::borrow::Cow;

/// Provider identifier - configured vendor name
pub type ProviderId = Cow<'static, str>;
