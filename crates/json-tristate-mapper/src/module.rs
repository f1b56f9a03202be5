//! Extension modules.

use std::sync::Arc;

use crate::codec::{CodecRegistry, ValueDecoder, ValueEncoder};
use crate::schema::SchemaModifier;
use crate::type_token::RawType;

/// A bundle of codecs and schema modifiers registered in one step.
pub trait Module: Send + Sync {
    /// Stable identifier; a mapper registers each id at most once.
    fn module_id(&self) -> &'static str;

    fn version(&self) -> &'static str;

    fn setup(&self, context: &mut SetupContext<'_>);
}

/// The registration surface a [`Module`] sees during setup.
pub struct SetupContext<'a> {
    codecs: &'a mut CodecRegistry,
    modifiers: &'a mut Vec<Arc<dyn SchemaModifier>>,
}

impl<'a> SetupContext<'a> {
    pub(crate) fn new(
        codecs: &'a mut CodecRegistry,
        modifiers: &'a mut Vec<Arc<dyn SchemaModifier>>,
    ) -> Self {
        Self { codecs, modifiers }
    }

    pub fn add_encoder(&mut self, raw: RawType, encoder: Arc<dyn ValueEncoder>) {
        self.codecs.add_encoder(raw, encoder);
    }

    pub fn add_decoder(&mut self, raw: RawType, decoder: Arc<dyn ValueDecoder>) {
        self.codecs.add_decoder(raw, decoder);
    }

    /// Modifiers run in registration order.
    pub fn add_schema_modifier(&mut self, modifier: Arc<dyn SchemaModifier>) {
        self.modifiers.push(modifier);
    }
}
