//! Conversion from Arrow `RecordBatch` into [`Batch`].

use crate::ConversionError;
use arrow_array::array::{
    Array, ArrayRef, BooleanArray, Float32Array, Float64Array, Int8Array, Int16Array, Int32Array,
    Int64Array, LargeStringArray, StringArray, UInt8Array, UInt16Array, UInt32Array,
};
use arrow_array::RecordBatch;
use arrow_schema::DataType;
use expectations_core::{Batch, Column, DataValue};

/// Converts every column of a `RecordBatch`.
///
/// Arrow nulls become [`DataValue::Null`]. Integer types up to 32 unsigned or
/// 64 signed bits map to `Int`, floats to `Float`, UTF-8 strings to `String`.
pub fn batch_from_record_batch(record_batch: &RecordBatch) -> Result<Batch, ConversionError> {
    let schema = record_batch.schema();
    let columns = schema
        .fields()
        .iter()
        .zip(record_batch.columns())
        .map(|(field, array)| convert_column(field.name(), array))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Batch::new(columns)?)
}

fn convert_column(name: &str, array: &ArrayRef) -> Result<Column, ConversionError> {
    let values = match array.data_type() {
        DataType::Boolean => {
            collect::<BooleanArray, _>(name, array, "BooleanArray", |a, i| DataValue::Bool(a.value(i)))?
        }
        DataType::Int8 => collect::<Int8Array, _>(name, array, "Int8Array", |a, i| {
            DataValue::Int(a.value(i) as i64)
        })?,
        DataType::Int16 => collect::<Int16Array, _>(name, array, "Int16Array", |a, i| {
            DataValue::Int(a.value(i) as i64)
        })?,
        DataType::Int32 => collect::<Int32Array, _>(name, array, "Int32Array", |a, i| {
            DataValue::Int(a.value(i) as i64)
        })?,
        DataType::Int64 => {
            collect::<Int64Array, _>(name, array, "Int64Array", |a, i| DataValue::Int(a.value(i)))?
        }
        DataType::UInt8 => collect::<UInt8Array, _>(name, array, "UInt8Array", |a, i| {
            DataValue::Int(a.value(i) as i64)
        })?,
        DataType::UInt16 => collect::<UInt16Array, _>(name, array, "UInt16Array", |a, i| {
            DataValue::Int(a.value(i) as i64)
        })?,
        DataType::UInt32 => collect::<UInt32Array, _>(name, array, "UInt32Array", |a, i| {
            DataValue::Int(a.value(i) as i64)
        })?,
        DataType::Float32 => collect::<Float32Array, _>(name, array, "Float32Array", |a, i| {
            DataValue::Float(a.value(i) as f64)
        })?,
        DataType::Float64 => collect::<Float64Array, _>(name, array, "Float64Array", |a, i| {
            DataValue::Float(a.value(i))
        })?,
        DataType::Utf8 => collect::<StringArray, _>(name, array, "StringArray", |a, i| {
            DataValue::String(a.value(i).to_string())
        })?,
        DataType::LargeUtf8 => {
            collect::<LargeStringArray, _>(name, array, "LargeStringArray", |a, i| {
                DataValue::String(a.value(i).to_string())
            })?
        }
        other => {
            return Err(ConversionError::UnsupportedType {
                column: name.to_string(),
                data_type: other.to_string(),
            });
        }
    };

    Ok(Column::new(name, values))
}

/// Downcasts `array` to `A` and reads every slot, mapping nulls to `Null`.
fn collect<A, F>(
    name: &str,
    array: &ArrayRef,
    expected: &str,
    value: F,
) -> Result<Vec<DataValue>, ConversionError>
where
    A: Array + 'static,
    F: Fn(&A, usize) -> DataValue,
{
    let typed = array
        .as_any()
        .downcast_ref::<A>()
        .ok_or_else(|| ConversionError::downcast(name, expected))?;

    Ok((0..typed.len())
        .map(|i| {
            if typed.is_null(i) {
                DataValue::Null
            } else {
                value(typed, i)
            }
        })
        .collect())
}
