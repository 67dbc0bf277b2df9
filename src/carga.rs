// ==============================================================================
// competencia_rust/src/carga.rs
//
// Carga de la tabla de contratos desde bytes parquet (opcionalmente envueltos
// en gzip o zstd).
//
//   bytes → descomprimir → parquet (solo las 7 columnas del esquema)
//         → ColumnasContrato → TablaContratos
//
// Tipos aceptados:
//   llaves   Utf8 / LargeUtf8 / Dictionary(int, Utf8) / enteros (→ texto)
//   importe  Float64 / Float32 / enteros          (nulo → NaN)
// ==============================================================================

use std::io::{Cursor, Read};

use arrow_array::types::{Int16Type, Int32Type, Int64Type, Int8Type};
use arrow_array::{
    Array, ArrayAccessor, ArrayRef, DictionaryArray,
    Float32Array, Float64Array,
    Int8Array, Int16Array, Int32Array, Int64Array,
    LargeStringArray, StringArray,
    UInt8Array, UInt16Array, UInt32Array, UInt64Array,
};
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ProjectionMask;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::tabla::{ColumnasContrato, TablaContratos};

/// Nombres de las columnas en la fuente.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EsquemaColumnas {
    pub dependencia:        String,
    pub claveuc:            String,
    pub proveedor:          String,
    pub procedimiento:      String,
    pub contrato:           String,
    pub tipo_procedimiento: String,
    pub importe_pesos:      String,
}

impl Default for EsquemaColumnas {
    fn default() -> Self {
        EsquemaColumnas {
            dependencia:        "DEPENDENCIA".into(),
            claveuc:            "CLAVEUC".into(),
            proveedor:          "PROVEEDOR_CONTRATISTA".into(),
            procedimiento:      "NUMERO_PROCEDIMIENTO".into(),
            contrato:           "CODIGO_CONTRATO".into(),
            tipo_procedimiento: "TIPO_PROCEDIMIENTO".into(),
            importe_pesos:      "IMPORTE_PESOS".into(),
        }
    }
}

impl EsquemaColumnas {
    fn nombres(&self) -> [&str; 7] {
        [
            &self.dependencia,
            &self.claveuc,
            &self.proveedor,
            &self.procedimiento,
            &self.contrato,
            &self.tipo_procedimiento,
            &self.importe_pesos,
        ]
    }
}

// ===========================================================================
// DESCOMPRESIÓN
// ===========================================================================
pub fn descomprimir(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b {
        let mut dec = flate2::read::GzDecoder::new(Cursor::new(data));
        let mut out = Vec::new();
        dec.read_to_end(&mut out)
            .map_err(|e| Error::Descompresion(format!("gzip: {e}")))?;
        Ok(out)
    } else if data.len() >= 4 && &data[0..4] == b"\x28\xb5\x2f\xfd" {
        zstd::decode_all(Cursor::new(data)).map_err(|e| Error::Descompresion(format!("zstd: {e}")))
    } else {
        Ok(data.to_vec())
    }
}

// ===========================================================================
// PARSEO PARQUET → TablaContratos
// ===========================================================================
pub fn cargar_parquet(raw: &[u8], esquema: &EsquemaColumnas) -> Result<TablaContratos> {
    let datos = descomprimir(raw)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::from(datos))?;

    let schema = builder.schema().clone();
    let nombres = esquema.nombres();
    for n in nombres {
        if schema.field_with_name(n).is_err() {
            return Err(Error::ColumnaFaltante(n.to_string()));
        }
    }

    let projection: Vec<usize> = schema
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, f)| nombres.contains(&f.name().as_str()))
        .map(|(i, _)| i)
        .collect();
    let mask = ProjectionMask::roots(builder.parquet_schema(), projection);
    let reader = builder.with_projection(mask).build()?;

    let mut cols = ColumnasContrato::default();
    for batch_result in reader {
        let batch = batch_result?;
        let columna = |nombre: &str| {
            batch
                .column_by_name(nombre)
                .ok_or_else(|| Error::ColumnaFaltante(nombre.to_string()))
        };
        extender_texto(&mut cols.dependencias,   &esquema.dependencia,        columna(&esquema.dependencia)?)?;
        extender_texto(&mut cols.claves_uc,      &esquema.claveuc,            columna(&esquema.claveuc)?)?;
        extender_texto(&mut cols.proveedores,    &esquema.proveedor,          columna(&esquema.proveedor)?)?;
        extender_texto(&mut cols.procedimientos, &esquema.procedimiento,      columna(&esquema.procedimiento)?)?;
        extender_texto(&mut cols.contratos,      &esquema.contrato,           columna(&esquema.contrato)?)?;
        extender_texto(&mut cols.tipos,          &esquema.tipo_procedimiento, columna(&esquema.tipo_procedimiento)?)?;
        extender_importe(&mut cols.importes,     &esquema.importe_pesos,      columna(&esquema.importe_pesos)?)?;
        debug!(filas = batch.num_rows(), "batch parquet leido");
    }

    let tabla = TablaContratos::nueva(cols)?;
    info!(filas = tabla.len(), descartadas = tabla.descartadas(), "contratos cargados");
    Ok(tabla)
}

fn tipo_no_soportado(nombre: &str, col: &ArrayRef) -> Error {
    Error::TipoColumna {
        columna: nombre.to_string(),
        tipo:    col.data_type().to_string(),
    }
}

fn extender_texto(out: &mut Vec<Option<String>>, nombre: &str, col: &ArrayRef) -> Result<()> {
    if let Some(a) = col.as_any().downcast_ref::<StringArray>() {
        out.extend(a.iter().map(|v| v.map(str::to_string)));
        return Ok(());
    }
    if let Some(a) = col.as_any().downcast_ref::<LargeStringArray>() {
        out.extend(a.iter().map(|v| v.map(str::to_string)));
        return Ok(());
    }

    macro_rules! try_dict {
        ($K:ty) => {
            if let Some(d) = col.as_any().downcast_ref::<DictionaryArray<$K>>() {
                let Some(t) = d.downcast_dict::<StringArray>() else {
                    return Err(tipo_no_soportado(nombre, col));
                };
                for j in 0..t.len() {
                    out.push(if t.is_valid(j) { Some(t.value(j).to_string()) } else { None });
                }
                return Ok(());
            }
        };
    }
    try_dict!(Int8Type);
    try_dict!(Int16Type);
    try_dict!(Int32Type);
    try_dict!(Int64Type);

    macro_rules! try_int {
        ($ArrayType:ty) => {
            if let Some(a) = col.as_any().downcast_ref::<$ArrayType>() {
                out.extend(a.iter().map(|v| v.map(|x| x.to_string())));
                return Ok(());
            }
        };
    }
    try_int!(Int64Array);
    try_int!(Int32Array);
    try_int!(Int16Array);
    try_int!(Int8Array);
    try_int!(UInt64Array);
    try_int!(UInt32Array);
    try_int!(UInt16Array);
    try_int!(UInt8Array);

    Err(tipo_no_soportado(nombre, col))
}

fn extender_importe(out: &mut Vec<f64>, nombre: &str, col: &ArrayRef) -> Result<()> {
    if let Some(a) = col.as_any().downcast_ref::<Float64Array>() {
        out.extend(a.iter().map(|v| v.unwrap_or(f64::NAN)));
        return Ok(());
    }
    if let Some(a) = col.as_any().downcast_ref::<Float32Array>() {
        out.extend(a.iter().map(|v| v.map_or(f64::NAN, f64::from)));
        return Ok(());
    }

    macro_rules! try_int {
        ($ArrayType:ty) => {
            if let Some(a) = col.as_any().downcast_ref::<$ArrayType>() {
                out.extend(a.iter().map(|v| v.map_or(f64::NAN, |x| x as f64)));
                return Ok(());
            }
        };
    }
    try_int!(Int64Array);
    try_int!(Int32Array);
    try_int!(Int16Array);
    try_int!(Int8Array);
    try_int!(UInt64Array);
    try_int!(UInt32Array);
    try_int!(UInt16Array);
    try_int!(UInt8Array);

    Err(tipo_no_soportado(nombre, col))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descomprimir_sin_envoltura_devuelve_igual() {
        let datos = b"PAR1 no comprimido";
        assert_eq!(descomprimir(datos).unwrap(), datos.to_vec());
    }

    #[test]
    fn descomprimir_zstd() {
        let comprimido = zstd::encode_all(Cursor::new(b"hola contratos".to_vec()), 3).unwrap();
        assert_eq!(&comprimido[0..4], b"\x28\xb5\x2f\xfd");
        assert_eq!(descomprimir(&comprimido).unwrap(), b"hola contratos".to_vec());
    }

    #[test]
    fn gzip_truncado_es_error() {
        let r = descomprimir(&[0x1f, 0x8b, 0x08]);
        assert!(matches!(r, Err(Error::Descompresion(_))));
    }

    #[test]
    fn esquema_por_defecto() {
        let e = EsquemaColumnas::default();
        assert_eq!(e.nombres()[1], "CLAVEUC");
        assert_eq!(e.nombres()[6], "IMPORTE_PESOS");
    }
}
