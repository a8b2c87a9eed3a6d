//! A source for callers that already hold decoded cells.

use crate::error::ReconcileError;
use crate::model::{RawSheet, SourceKind};
use crate::source::Source;

pub struct MemorySource {
    kind: SourceKind,
    sheet: RawSheet,
}

impl MemorySource {
    pub fn new(kind: SourceKind, sheet: RawSheet) -> Self {
        Self { kind, sheet }
    }
}

#[async_trait::async_trait]
impl Source for MemorySource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn first_sheet(&mut self) -> Result<RawSheet, ReconcileError> {
        Ok(self.sheet.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::load_pair;
    use crate::test::{tempo_sheet, time_labor_sheet};

    #[tokio::test]
    async fn test_load_pair_from_memory() {
        let mut tempo = MemorySource::new(SourceKind::Tempo, tempo_sheet());
        let mut time_labor = MemorySource::new(SourceKind::TimeLabor, time_labor_sheet());
        assert_eq!(time_labor.kind(), SourceKind::TimeLabor);
        let (a, b) = load_pair(&mut tempo, &mut time_labor).await.unwrap();
        assert_eq!(a, tempo_sheet());
        assert_eq!(b, time_labor_sheet());
    }
}
