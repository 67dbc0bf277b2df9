// ==============================================================================
// competencia_rust/src/error.rs
//
// Errores de construccion y carga de la tabla de contratos. Los casos
// numericos (division entre cero, unidades sin actividad) NUNCA llegan aqui:
// se propagan como NaN/inf dentro de las tablas de features.
// ==============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("columna {columna}: {obtenido} filas, se esperaban {esperado}")]
    LongitudesDistintas {
        columna:  &'static str,
        esperado: usize,
        obtenido: usize,
    },

    #[error("no se encontro la columna requerida {0}")]
    ColumnaFaltante(String),

    #[error("columna {columna}: tipo no soportado {tipo}")]
    TipoColumna { columna: String, tipo: String },

    #[error("columna duplicada al unir features: {0}")]
    ColumnaDuplicada(String),

    #[error("descompresion: {0}")]
    Descompresion(String),

    #[error("parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),
}

pub type Result<T> = std::result::Result<T, Error>;
