//! Registry doubles and filesystem helpers for CLI tests.

use std::cell::{Cell, RefCell};
use std::fs;

use camino::Utf8Path;
use parcela_core::test_support::{ScriptedLocator, StubDetailSource, candidate};
use parcela_core::{
    DetailLookup, Located, ParcelDetail, ParcelDetailSource, ParcelLocator, ParcelReference,
    ProjectedPoint, RegistryError,
};
use parcela_data::RegistryClientConfig;

use crate::CliError;
use crate::resolve::{Registry, RegistryBuilder};

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path.as_std_path(), contents).expect("write test file");
}

/// Registry double combining a scripted locator with a stub detail source.
pub(super) struct StubRegistry {
    locator: ScriptedLocator,
    details: StubDetailSource,
}

impl ParcelLocator for StubRegistry {
    fn locate(&self, point: &ProjectedPoint) -> Result<Located, RegistryError> {
        self.locator.locate(point)
    }
}

impl ParcelDetailSource for StubRegistry {
    fn fetch_detail(&self, reference: &ParcelReference) -> Result<DetailLookup, RegistryError> {
        self.details.fetch_detail(reference)
    }
}

/// Builder handing out a registry that finds `reference` on the exact-point
/// lookup, and counting how often it was asked to build one.
pub(super) struct StubRegistryBuilder {
    reference: &'static str,
    detail: ParcelDetail,
    builds: Cell<usize>,
    seen_base_url: RefCell<Option<String>>,
}

impl StubRegistryBuilder {
    pub(super) fn finding(reference: &'static str, detail: ParcelDetail) -> Self {
        Self {
            reference,
            detail,
            builds: Cell::new(0),
            seen_base_url: RefCell::new(None),
        }
    }

    pub(super) fn builds(&self) -> usize {
        self.builds.get()
    }

    pub(super) fn seen_base_url(&self) -> Option<String> {
        self.seen_base_url.borrow().clone()
    }
}

impl RegistryBuilder for StubRegistryBuilder {
    fn build(&self, config: &RegistryClientConfig) -> Result<Box<dyn Registry>, CliError> {
        self.builds.set(self.builds.get() + 1);
        self.seen_base_url.replace(Some(config.base_url.clone()));
        Ok(Box::new(StubRegistry {
            locator: ScriptedLocator::missing().found_on_call(0, vec![candidate(self.reference, 0.0)]),
            details: StubDetailSource::with_detail(self.detail.clone()),
        }))
    }
}
