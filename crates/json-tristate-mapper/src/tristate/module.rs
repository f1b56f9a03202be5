use std::sync::Arc;

use crate::module::{Module, SetupContext};

use super::{AbsentPropertyFilter, TriStateDecoder, TriStateEncoder, TRI_STATE};

/// Registers the `TriState` codecs and the [`AbsentPropertyFilter`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TriStateModule;

impl TriStateModule {
    pub const MODULE_ID: &'static str = "json-tristate";
}

impl Module for TriStateModule {
    fn module_id(&self) -> &'static str {
        Self::MODULE_ID
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn setup(&self, context: &mut SetupContext<'_>) {
        context.add_encoder(TRI_STATE, Arc::new(TriStateEncoder::new()));
        context.add_decoder(TRI_STATE, Arc::new(TriStateDecoder::new()));
        context.add_schema_modifier(Arc::new(AbsentPropertyFilter));
    }
}
