/// Outcome of an enrichment step that must always yield a value.
///
/// `Degraded` carries the fallback that was substituted and the reason the
/// primary path failed, so callers can log it before discarding the detail.
#[derive(Debug, Clone, PartialEq)]
pub enum Enrichment<T> {
    Ok(T),
    Degraded { value: T, reason: String },
}

impl<T> Enrichment<T> {
    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        Enrichment::Degraded {
            value,
            reason: reason.into(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Enrichment::Degraded { .. })
    }

    /// The failure reason, if the value is a fallback.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Enrichment::Ok(_) => None,
            Enrichment::Degraded { reason, .. } => Some(reason),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Enrichment::Ok(v) | Enrichment::Degraded { value: v, .. } => v,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Enrichment::Ok(v) | Enrichment::Degraded { value: v, .. } => v,
        }
    }
}
