// ==============================================================================
// competencia_rust/src/features.rs
//
// Features de competencia por unidad compradora (CLAVEUC).
//
//   contratos_por_proveedor              conteo_contratos / proveedores_distintos
//   porcentaje_procedimientos_por_tipo   % de procedimientos distintos por tipo
//   porcentaje_monto_tipo_procedimiento  % del monto por tipo
//   importe_promedio_por_contrato        monto_total / conteo_contratos
//   calcular_ihh_id_contratos            IHH e ID sobre participacion en contratos
//   calcular_ihh_id_monto                IHH e ID sobre participacion en monto
//
// Cada funcion vuelve a colapsar la tabla a totales por contrato; ninguna
// guarda estado entre llamadas. Divisiones entre cero → NaN/inf.
// ==============================================================================

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::aritmetica::{dividir, porcentaje};
use crate::columnas::{MapaColumnas, PREFIJO_MONTO, PREFIJO_PROCEDIMIENTOS};
use crate::contratos::{colapsar_contratos, resumen_por_unidad, Agrupacion, ContratoTotal};
use crate::feature::TablaFeature;
use crate::tabla::TablaContratos;

pub const CONTRATOS_POR_PROVEEDOR: &str = "contratos_por_proveedor";
pub const MONTO_CONTRATO_PROMEDIO: &str = "monto_contrato_promedio";
pub const IHH_TOTAL_CONTRATOS:     &str = "IHH_total_contratos";
pub const ID_TOTAL_CONTRATOS:      &str = "ID_total_contratos";
pub const IHH_TOTAL_MONTO:         &str = "IHH_total_monto";
pub const ID_TOTAL_MONTO:          &str = "ID_total_monto";

pub fn contratos_por_proveedor(tabla: &TablaContratos) -> TablaFeature {
    let contratos = colapsar_contratos(tabla, Agrupacion::PorContrato);
    let mut out = TablaFeature::nueva([CONTRATOS_POR_PROVEEDOR]);
    for (uc, r) in resumen_por_unidad(&contratos) {
        let ratio = dividir(r.conteo_contratos as f64, r.proveedores_distintos as f64);
        out.agregar(uc, vec![ratio]);
    }
    debug!(unidades = out.len(), "contratos_por_proveedor");
    out
}

pub fn porcentaje_procedimientos_por_tipo(tabla: &TablaContratos) -> TablaFeature {
    let contratos = colapsar_contratos(tabla, Agrupacion::PorContratoYTipo);

    let mut procedimientos: BTreeMap<(&str, &str), BTreeSet<&str>> = BTreeMap::new();
    for c in &contratos {
        if let Some(tipo) = c.llave.tipo {
            procedimientos
                .entry((c.llave.claveuc, tipo))
                .or_default()
                .insert(c.llave.procedimiento);
        }
    }
    let conteos: BTreeMap<(&str, &str), f64> = procedimientos
        .into_iter()
        .map(|(k, procs)| (k, procs.len() as f64))
        .collect();

    let out = pivote_porcentual(&conteos, PREFIJO_PROCEDIMIENTOS);
    debug!(unidades = out.len(), tipos = out.columnas().len(), "porcentaje_procedimientos_por_tipo");
    out
}

pub fn porcentaje_monto_tipo_procedimiento(tabla: &TablaContratos) -> TablaFeature {
    let contratos = colapsar_contratos(tabla, Agrupacion::PorContratoYTipo);

    let mut montos: BTreeMap<(&str, &str), f64> = BTreeMap::new();
    for c in &contratos {
        if let Some(tipo) = c.llave.tipo {
            *montos.entry((c.llave.claveuc, tipo)).or_insert(0.0) += c.importe;
        }
    }

    let out = pivote_porcentual(&montos, PREFIJO_MONTO);
    debug!(unidades = out.len(), tipos = out.columnas().len(), "porcentaje_monto_tipo_procedimiento");
    out
}

pub fn importe_promedio_por_contrato(tabla: &TablaContratos) -> TablaFeature {
    let contratos = colapsar_contratos(tabla, Agrupacion::PorContrato);
    let mut out = TablaFeature::nueva([MONTO_CONTRATO_PROMEDIO]);
    for (uc, r) in resumen_por_unidad(&contratos) {
        out.agregar(uc, vec![dividir(r.monto_total, r.conteo_contratos as f64)]);
    }
    debug!(unidades = out.len(), "importe_promedio_por_contrato");
    out
}

pub fn calcular_ihh_id_contratos(tabla: &TablaContratos) -> TablaFeature {
    let contratos = colapsar_contratos(tabla, Agrupacion::PorContrato);

    // (uc, proveedor) → contratos distintos sumados sobre procedimientos
    let mut por_poc: BTreeMap<&str, BTreeMap<&str, BTreeSet<(&str, &str)>>> = BTreeMap::new();
    for c in &contratos {
        por_poc
            .entry(c.llave.claveuc)
            .or_default()
            .entry(c.llave.proveedor)
            .or_default()
            .insert((c.llave.procedimiento, c.llave.contrato));
    }
    let magnitudes: BTreeMap<&str, BTreeMap<&str, f64>> = por_poc
        .into_iter()
        .map(|(uc, pocs)| {
            let m: BTreeMap<&str, f64> = pocs
                .into_iter()
                .map(|(poc, cs)| (poc, cs.len() as f64))
                .collect();
            (uc, m)
        })
        .collect();

    let out = indices_concentracion(&magnitudes, IHH_TOTAL_CONTRATOS, ID_TOTAL_CONTRATOS);
    debug!(unidades = out.len(), "calcular_ihh_id_contratos");
    out
}

pub fn calcular_ihh_id_monto(tabla: &TablaContratos) -> TablaFeature {
    let contratos = colapsar_contratos(tabla, Agrupacion::PorContrato);
    let magnitudes = monto_por_proveedor(&contratos);
    let out = indices_concentracion(&magnitudes, IHH_TOTAL_MONTO, ID_TOTAL_MONTO);
    debug!(unidades = out.len(), "calcular_ihh_id_monto");
    out
}

fn monto_por_proveedor<'a>(contratos: &[ContratoTotal<'a>]) -> BTreeMap<&'a str, BTreeMap<&'a str, f64>> {
    let mut out: BTreeMap<&'a str, BTreeMap<&'a str, f64>> = BTreeMap::new();
    for c in contratos {
        *out.entry(c.llave.claveuc)
            .or_default()
            .entry(c.llave.proveedor)
            .or_insert(0.0) += c.importe;
    }
    out
}

/// (uc, tipo) → valor  ⇒  una fila por uc, una columna por tipo (faltantes = 0),
/// cada celda como porcentaje del total de su fila.
fn pivote_porcentual(celdas: &BTreeMap<(&str, &str), f64>, prefijo: &str) -> TablaFeature {
    let mapa = MapaColumnas::desde_tipos(prefijo, celdas.keys().map(|&(_, tipo)| tipo));

    let mut filas: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for (&(uc, tipo), &valor) in celdas {
        let fila = filas.entry(uc).or_insert_with(|| vec![0.0; mapa.len()]);
        if let Some(j) = mapa.indice(tipo) {
            fila[j] += valor;
        }
    }

    let mut out = TablaFeature::nueva(mapa.nombres().iter().cloned());
    for (uc, fila) in filas {
        let total: f64 = fila.iter().sum();
        out.agregar(uc, fila.into_iter().map(|v| porcentaje(v, total)).collect());
    }
    out
}

/// uc → (proveedor → magnitud)  ⇒  IHH y ID por uc.
///
/// ```text
/// Share_i = 100 * m_i / Σ m
/// IHH     = Σ Share_i²
/// ID      = Σ (100 * Share_i² / IHH)²
/// ```
fn indices_concentracion(
    magnitudes: &BTreeMap<&str, BTreeMap<&str, f64>>,
    col_ihh: &str,
    col_id: &str,
) -> TablaFeature {
    let mut out = TablaFeature::nueva([col_ihh, col_id]);
    for (&uc, por_poc) in magnitudes {
        let total: f64 = por_poc.values().sum();
        let ihh: Vec<f64> = por_poc
            .values()
            .map(|&m| {
                let share = dividir(m, total) * 100.0;
                share * share
            })
            .collect();
        let ihh_total: f64 = ihh.iter().sum();
        let id_total: f64 = ihh
            .iter()
            .map(|&h| {
                let d = dividir(h, ihh_total) * 100.0;
                d * d
            })
            .sum();
        out.agregar(uc, vec![ihh_total, id_total]);
    }
    out
}
