use crate::config::{Config, Step};
use crate::converter::convert;
use crate::error::MapError;
use crate::mapping::Override;
use crate::record::{DynRecord, Record, RecordShape, RecordValue};
use crate::schema::{FieldDescriptor, FieldPath};
use crate::value::Value;

impl<S: Record, D: Record> Config<S, D> {
    /// Map one source record into a fresh destination.
    ///
    /// Destination fields are visited in declaration order; the first failing
    /// field aborts the call.
    pub fn map(&self, source: &S) -> Result<D, MapError> {
        let mut dest = D::default();
        self.populate(source, &mut dest, &self.dest, &mut Vec::new())?;
        Ok(dest)
    }

    /// Map every element in order. The first error discards all results.
    pub fn map_slice(&self, sources: &[S]) -> Result<Vec<D>, MapError> {
        sources
            .iter()
            .enumerate()
            .map(|(i, source)| {
                self.map(source).inspect_err(|e| {
                    tracing::debug!(source = %self.source_name, index = i, error = %e, "map_slice aborted");
                })
            })
            .collect()
    }

    fn populate(
        &self,
        source: &S,
        dest: &mut dyn DynRecord,
        fields: &[FieldDescriptor],
        path: &mut FieldPath,
    ) -> Result<(), MapError> {
        for df in fields {
            path.push(df.index);
            let result = self.populate_field(source, dest, df, path);
            path.pop();
            result?;
        }
        Ok(())
    }

    fn populate_field(
        &self,
        source: &S,
        dest: &mut dyn DynRecord,
        df: &FieldDescriptor,
        path: &mut FieldPath,
    ) -> Result<(), MapError> {
        match self.step(path, df) {
            Step::Skip => {
                tracing::trace!(dest = %self.dest_name, field = df.name, "unexported, skipped");
            }
            Step::Override(o) => {
                tracing::trace!(dest = %self.dest_name, field = df.name, ignore = o.ignore, "override");
                if let Some(value) = o.apply(source)? {
                    self.store_override(dest, df, value)?;
                }
            }
            Step::Match(sf) => {
                tracing::trace!(dest = %self.dest_name, field = df.name, "matched by name");
                let value = <S as Record>::read_field(source, sf.index).ok_or_else(|| self.missing(df))?;
                let value = convert(&sf.ty, value, &df.ty)?;
                self.store(dest, df, &sf.ty.name, value)?;
            }
            Step::Patch(sf) => {
                tracing::trace!(dest = %self.dest_name, field = df.name, "matched by name, patched");
                let value = <S as Record>::read_field(source, sf.index).ok_or_else(|| self.missing(df))?;
                let value = match convert(&sf.ty, value, &df.ty)? {
                    Value::Record(mut record) => {
                        self.patch(source, record.as_dyn_mut(), &df.promoted, df.ty.shape, path)?;
                        Value::Record(record)
                    }
                    other => other,
                };
                self.store(dest, df, &sf.ty.name, value)?;
            }
            Step::Promote => {
                tracing::trace!(dest = %self.dest_name, field = df.name, "embedded, promoted");
                let shape = df.ty.shape.ok_or_else(|| self.missing(df))?;
                let mut inner = (shape.zeroed)();
                self.populate(source, &mut *inner, &df.promoted, path)?;
                let value = Value::Record(RecordValue::from_boxed(inner));
                self.store(dest, df, &df.ty.name, value)?;
            }
            Step::Missing => return Err(self.missing(df)),
        }
        Ok(())
    }

    /// Apply the overrides registered below `path` to a record that was
    /// copied whole. `shape` is the record's own type, used to reset ignored
    /// fields to their zero value.
    fn patch(
        &self,
        source: &S,
        record: &mut dyn DynRecord,
        fields: &[FieldDescriptor],
        shape: Option<RecordShape>,
        path: &mut FieldPath,
    ) -> Result<(), MapError> {
        for pf in fields.iter().filter(|pf| pf.exported) {
            path.push(pf.index);
            let result = self.patch_field(source, record, pf, shape, path);
            path.pop();
            result?;
        }
        Ok(())
    }

    fn patch_field(
        &self,
        source: &S,
        record: &mut dyn DynRecord,
        pf: &FieldDescriptor,
        shape: Option<RecordShape>,
        path: &mut FieldPath,
    ) -> Result<(), MapError> {
        if let Some(o) = self.active_override(path) {
            tracing::trace!(dest = %self.dest_name, field = pf.name, ignore = o.ignore, "override on copied record");
            return match self.override_value(o, source, pf, shape)? {
                Some(value) => self.store_override(record, pf, value),
                None => Ok(()),
            };
        }
        if pf.embedded && self.has_nested_overrides(path) {
            if let Some(Value::Record(mut inner)) = record.get_field(pf.index) {
                self.patch(source, inner.as_dyn_mut(), &pf.promoted, pf.ty.shape, path)?;
                self.store(record, pf, &pf.ty.name, Value::Record(inner))?;
            }
        }
        Ok(())
    }

    /// Value an override writes into an already populated field: the
    /// transform result, or the field's zero value when ignored.
    fn override_value(
        &self,
        o: &Override<S>,
        source: &S,
        pf: &FieldDescriptor,
        shape: Option<RecordShape>,
    ) -> Result<Option<Value>, MapError> {
        match o.apply(source)? {
            Some(value) => Ok(Some(value)),
            None => Ok(shape.and_then(|shape| (shape.zeroed)().get_field(pf.index))),
        }
    }

    fn store_override(
        &self,
        dest: &mut dyn DynRecord,
        df: &FieldDescriptor,
        value: Value,
    ) -> Result<(), MapError> {
        if dest.set_field(df.index, value) {
            Ok(())
        } else {
            Err(MapError::TransformOutput {
                field: df.name,
                expected: df.ty.name.clone(),
            })
        }
    }

    fn store(
        &self,
        dest: &mut dyn DynRecord,
        df: &FieldDescriptor,
        src_type: &str,
        value: Value,
    ) -> Result<(), MapError> {
        if dest.set_field(df.index, value) {
            Ok(())
        } else {
            Err(MapError::IncompatibleTypes {
                dest: df.ty.name.clone(),
                src: src_type.to_string(),
            })
        }
    }

    fn missing(&self, df: &FieldDescriptor) -> MapError {
        MapError::MissingField {
            field: df.name,
            source_type: self.source_name.clone(),
        }
    }
}
