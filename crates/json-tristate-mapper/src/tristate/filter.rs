use std::any::Any;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::MapperError;
use crate::mapped::FieldValue;
use crate::schema::{ObjectDescription, PropertyWriter, SchemaModifier};
use crate::type_token::TypeToken;

use super::TRI_STATE;

/// Wraps the writers of `TriState` fields so that absent values are left out
/// of the output entirely.
///
/// Writers of other types pass through untouched, as do writers that are
/// already absent-aware, so applying the filter twice changes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct AbsentPropertyFilter;

impl SchemaModifier for AbsentPropertyFilter {
    fn change_properties(
        &self,
        object: &ObjectDescription,
        writers: Vec<Arc<dyn PropertyWriter>>,
    ) -> Vec<Arc<dyn PropertyWriter>> {
        let mut wrapped = 0usize;
        let writers: Vec<Arc<dyn PropertyWriter>> = writers
            .into_iter()
            .map(|writer| {
                if writer.declared_type().raw() == TRI_STATE && !writer.is_absent_aware() {
                    wrapped += 1;
                    Arc::new(AbsentAwareWriter::new(writer)) as Arc<dyn PropertyWriter>
                } else {
                    writer
                }
            })
            .collect();
        if wrapped > 0 {
            debug!(object = object.type_name, wrapped, "wrapped tri-state writers");
        }
        writers
    }
}

/// A writer that writes nothing, not even the key, when the field is absent.
pub struct AbsentAwareWriter {
    inner: Arc<dyn PropertyWriter>,
}

impl AbsentAwareWriter {
    pub fn new(inner: Arc<dyn PropertyWriter>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &Arc<dyn PropertyWriter> {
        &self.inner
    }
}

impl PropertyWriter for AbsentAwareWriter {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn declared_type(&self) -> &TypeToken {
        self.inner.declared_type()
    }

    fn get<'a>(&self, object: &'a dyn Any) -> Result<&'a dyn FieldValue, MapperError> {
        self.inner.get(object)
    }

    fn write_field(&self, object: &dyn Any, out: &mut Map<String, Value>) -> Result<(), MapperError> {
        if self.inner.get(object)?.presence().is_absent() {
            trace!(field = self.name(), "skipping absent field");
            return Ok(());
        }
        self.inner.write_field(object, out)
    }

    fn is_absent_aware(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CodecResolver, FieldContext, SerdeEncoder, ValueEncoder};
    use crate::config::{Inclusion, MapperConfig};
    use crate::mapped::Mapped;
    use crate::schema::FieldWriter;
    use crate::tristate::TriStateEncoder;
    use json_tristate::TriState;
    use serde_json::json;

    struct Row {
        id: u8,
        note: TriState<String>,
    }

    fn note_encoder() -> Arc<dyn ValueEncoder> {
        let config = MapperConfig::new();
        let resolver = CodecResolver::plain(&config);
        let token = <TriState<String> as Mapped>::type_token();
        TriStateEncoder::new()
            .contextualize(&FieldContext {
                object: "Row",
                field: "note",
                declared: &token,
                resolver: &resolver,
            })
            .unwrap()
    }

    fn writers() -> Vec<Arc<dyn PropertyWriter>> {
        vec![
            Arc::new(FieldWriter::new(
                "id",
                TypeToken::of::<u8>(),
                |r: &Row| &r.id,
                Arc::new(SerdeEncoder),
                Inclusion::Always,
            )) as Arc<dyn PropertyWriter>,
            Arc::new(FieldWriter::new(
                "note",
                <TriState<String> as Mapped>::type_token(),
                |r: &Row| &r.note,
                note_encoder(),
                Inclusion::Always,
            )) as Arc<dyn PropertyWriter>,
        ]
    }

    fn encode(writers: &[Arc<dyn PropertyWriter>], row: &Row) -> Value {
        let mut out = Map::new();
        for w in writers {
            w.write_field(row, &mut out).unwrap();
        }
        Value::Object(out)
    }

    #[test]
    fn wraps_only_tri_state_writers() {
        let filtered = AbsentPropertyFilter.change_properties(&ObjectDescription::of::<Row>(), writers());
        assert!(!filtered[0].is_absent_aware());
        assert!(filtered[1].is_absent_aware());
    }

    #[test]
    fn absent_field_is_skipped() {
        let filtered = AbsentPropertyFilter.change_properties(&ObjectDescription::of::<Row>(), writers());
        let row = Row {
            id: 1,
            note: TriState::Absent,
        };
        assert_eq!(encode(&filtered, &row), json!({"id": 1}));
        assert_eq!(encode(&writers(), &row), json!({"id": 1, "note": null}));
    }

    #[test]
    fn null_and_value_are_written() {
        let filtered = AbsentPropertyFilter.change_properties(&ObjectDescription::of::<Row>(), writers());
        let null = Row {
            id: 1,
            note: TriState::Null,
        };
        assert_eq!(encode(&filtered, &null), json!({"id": 1, "note": null}));
        let value = Row {
            id: 1,
            note: TriState::Value("hi".into()),
        };
        assert_eq!(encode(&filtered, &value), json!({"id": 1, "note": "hi"}));
    }

    #[test]
    fn applying_twice_keeps_the_same_writers() {
        let description = ObjectDescription::of::<Row>();
        let once = AbsentPropertyFilter.change_properties(&description, writers());
        let twice = AbsentPropertyFilter.change_properties(&description, once.clone());
        assert_eq!(once.len(), twice.len());
        for (a, b) in once.iter().zip(&twice) {
            assert!(Arc::ptr_eq(a, b));
        }
    }
}
