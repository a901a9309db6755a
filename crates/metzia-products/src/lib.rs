//! # metzia-products
//!
//! Product search backends (offline mock and the AliExpress Open
//! Platform), affiliate link resolution, and product caption formatting.

pub mod affiliate;
pub mod caption;
mod extract;
pub mod mock;
pub mod open_platform;


use metzia_core::{config::SearchConfig, traits::ProductSource};
use std::sync::Arc;
use tracing::info;

/// Build the product source selected by the configuration.
///
/// The live Open Platform backend is used only when an app key is
/// configured; otherwise the offline mock serves the whole process
/// lifetime.
pub fn build_source(config: &SearchConfig) -> Arc<dyn ProductSource> {
    if config.use_mock() {
        info!("no app key configured, using mock product source");
        Arc::new(mock::MockSource)
    } else {
        Arc::new(open_platform::OpenPlatformSource::new(config.clone()))
    }
}
