// ==============================================================================
// competencia_rust/src/matriz.rs
//
// Lado del consumidor: correr las seis features y unirlas por CLAVEUC.
//
//   calcular_todas      → Rayon (join anidado), orden fijo de salida
//   MatrizFeatures::unir → outer join; celda sin dato = NaN
//
// Los no finitos se conservan. Imputarlos es decision del consumidor y solo
// ocurre si llama imputar_no_finitos.
// ==============================================================================

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::error::{Error, Result};
use crate::feature::TablaFeature;
use crate::features::{
    calcular_ihh_id_contratos, calcular_ihh_id_monto, contratos_por_proveedor,
    importe_promedio_por_contrato, porcentaje_monto_tipo_procedimiento,
    porcentaje_procedimientos_por_tipo,
};
use crate::tabla::TablaContratos;

/// Las seis tablas, en el orden: contratos_por_proveedor, % procedimientos,
/// % monto, promedio, IHH/ID contratos, IHH/ID monto.
pub fn calcular_todas(tabla: &TablaContratos) -> Vec<TablaFeature> {
    let ((a, b), ((c, d), (e, f))) = rayon::join(
        || {
            rayon::join(
                || contratos_por_proveedor(tabla),
                || porcentaje_procedimientos_por_tipo(tabla),
            )
        },
        || {
            rayon::join(
                || {
                    rayon::join(
                        || porcentaje_monto_tipo_procedimiento(tabla),
                        || importe_promedio_por_contrato(tabla),
                    )
                },
                || rayon::join(|| calcular_ihh_id_contratos(tabla), || calcular_ihh_id_monto(tabla)),
            )
        },
    );
    vec![a, b, c, d, e, f]
}

#[derive(Debug, Clone, Default)]
pub struct MatrizFeatures {
    tabla: TablaFeature,
}

impl MatrizFeatures {
    pub fn desde_contratos(tabla: &TablaContratos) -> Result<Self> {
        Self::unir(&calcular_todas(tabla))
    }

    pub fn unir(tablas: &[TablaFeature]) -> Result<Self> {
        let mut columnas: Vec<String> = Vec::new();
        let mut vistas: HashSet<&str> = HashSet::new();
        for t in tablas {
            for c in t.columnas() {
                if !vistas.insert(c.as_str()) {
                    return Err(Error::ColumnaDuplicada(c.clone()));
                }
                columnas.push(c.clone());
            }
        }

        let ancho = columnas.len();
        let mut filas: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        let mut offset = 0;
        for t in tablas {
            for f in t.filas() {
                let fila = filas
                    .entry(f.claveuc.as_str())
                    .or_insert_with(|| vec![f64::NAN; ancho]);
                fila[offset..offset + f.valores.len()].copy_from_slice(&f.valores);
            }
            offset += t.columnas().len();
        }

        let mut tabla = TablaFeature::nueva(columnas);
        for (uc, valores) in filas {
            tabla.agregar(uc, valores);
        }
        debug!(unidades = tabla.len(), columnas = ancho, "matriz de features");
        Ok(MatrizFeatures { tabla })
    }

    /// Reemplaza NaN y +-inf por `valor`.
    pub fn imputar_no_finitos(mut self, valor: f64) -> Self {
        let columnas = self.tabla.columnas().to_vec();
        let mut tabla = TablaFeature::nueva(columnas);
        for f in self.tabla.filas() {
            let valores = f
                .valores
                .iter()
                .map(|&v| if v.is_finite() { v } else { valor })
                .collect();
            tabla.agregar(f.claveuc.clone(), valores);
        }
        self.tabla = tabla;
        self
    }

    pub fn tabla(&self) -> &TablaFeature {
        &self.tabla
    }

    pub fn into_tabla(self) -> TablaFeature {
        self.tabla
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outer_join_rellena_con_nan() {
        let mut a = TablaFeature::nueva(["x"]);
        a.agregar("U1", vec![1.0]);
        let mut b = TablaFeature::nueva(["y", "z"]);
        b.agregar("U1", vec![2.0, 3.0]);
        b.agregar("U2", vec![4.0, 5.0]);

        let m = MatrizFeatures::unir(&[a, b]).unwrap();
        let t = m.tabla();
        assert_eq!(t.columnas(), ["x", "y", "z"]);
        assert_eq!(t.valor("U1", "z"), Some(3.0));
        assert!(t.valor("U2", "x").unwrap().is_nan());

        let imputada = m.imputar_no_finitos(0.0);
        assert_eq!(imputada.tabla().valor("U2", "x"), Some(0.0));
        assert_eq!(imputada.tabla().valor("U2", "y"), Some(4.0));
    }

    #[test]
    fn columnas_duplicadas_son_error() {
        let a = TablaFeature::nueva(["x"]);
        let b = TablaFeature::nueva(["x"]);
        assert!(matches!(MatrizFeatures::unir(&[a, b]), Err(Error::ColumnaDuplicada(c)) if c == "x"));
    }
}
