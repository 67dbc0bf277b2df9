// ==============================================================================
// competencia_rust/src/lib.rs  v0.1
//
// Features de competencia por UNIDAD COMPRADORA (CLAVEUC) sobre contratos de
// compras publicas. Una fila de entrada = una partida de contrato.
//
//   TablaContratos  →  colapso por contrato (suma de partidas)
//                   →  agregacion por uc
//                   →  TablaFeature (una fila por CLAVEUC)
//
// Features:
//   contratos_por_proveedor               contratos / proveedores distintos
//   porcentaje_procedimientos_por_tipo    pc_procedimientos_<tipo>
//   porcentaje_monto_tipo_procedimiento   pc_monto_<tipo>
//   importe_promedio_por_contrato         monto_contrato_promedio
//   calcular_ihh_id_contratos             IHH_total_contratos, ID_total_contratos
//   calcular_ihh_id_monto                 IHH_total_monto, ID_total_monto
//
// Sin estado global: cada llamada recalcula desde el snapshot de entrada.
// Division entre cero → NaN/inf silencioso, nunca error.
// ==============================================================================

pub mod aritmetica;
pub mod carga;
pub mod columnas;
pub mod contratos;
pub mod error;
pub mod feature;
pub mod features;
pub mod matriz;
pub mod tabla;

#[cfg(feature = "python")]
mod python;

pub use carga::{cargar_parquet, descomprimir, EsquemaColumnas};
pub use contratos::{colapsar_contratos, resumen_por_unidad, Agrupacion, ContratoTotal, ResumenUnidad};
pub use error::{Error, Result};
pub use feature::{FilaFeature, TablaFeature};
pub use features::{
    calcular_ihh_id_contratos, calcular_ihh_id_monto, contratos_por_proveedor,
    importe_promedio_por_contrato, porcentaje_monto_tipo_procedimiento,
    porcentaje_procedimientos_por_tipo,
};
pub use matriz::{calcular_todas, MatrizFeatures};
pub use tabla::{ColumnasContrato, LineaContrato, TablaContratos};
