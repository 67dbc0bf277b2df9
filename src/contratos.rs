// ==============================================================================
// competencia_rust/src/contratos.rs
//
// Colapso a totales por contrato: el paso comun a TODAS las features.
//
//   partidas  →  (uc, dependencia, proveedor, procedimiento, contrato[, tipo])
//             →  IMPORTE_PESOS sumado  (= valor total del contrato)
//
// El agrupamiento corre en Rayon (fold/reduce sobre indices de fila); la suma
// de cada contrato se hace despues, en el orden original de las filas, para
// que dos llamadas sobre la misma tabla den exactamente los mismos bits.
// Contratos con importe total 0 se conservan.
// ==============================================================================

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rayon::prelude::*;

use crate::aritmetica::suma_sin_faltantes;
use crate::tabla::TablaContratos;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Agrupacion {
    /// uc, dependencia, proveedor, procedimiento, contrato
    PorContrato,
    /// Igual que `PorContrato` mas TIPO_PROCEDIMIENTO; filas sin tipo quedan fuera.
    PorContratoYTipo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LlaveContrato<'a> {
    pub claveuc:       &'a str,
    pub dependencia:   &'a str,
    pub proveedor:     &'a str,
    pub procedimiento: &'a str,
    pub contrato:      &'a str,
    pub tipo:          Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContratoTotal<'a> {
    pub llave:   LlaveContrato<'a>,
    pub importe: f64,
}

/// Una fila por contrato unico, ordenadas por llave (CLAVEUC primero).
pub fn colapsar_contratos(tabla: &TablaContratos, agrupacion: Agrupacion) -> Vec<ContratoTotal<'_>> {
    type Local<'a> = HashMap<LlaveContrato<'a>, Vec<usize>>;

    let grupos = (0..tabla.len())
        .into_par_iter()
        .fold(Local::new, |mut acc, i| {
            let f = tabla.fila(i);
            let tipo = match (agrupacion, f.tipo) {
                (Agrupacion::PorContrato, _)            => None,
                (Agrupacion::PorContratoYTipo, Some(t)) => Some(t),
                (Agrupacion::PorContratoYTipo, None)    => return acc,
            };
            let llave = LlaveContrato {
                claveuc:       f.claveuc,
                dependencia:   f.dependencia,
                proveedor:     f.proveedor,
                procedimiento: f.procedimiento,
                contrato:      f.contrato,
                tipo,
            };
            acc.entry(llave).or_default().push(i);
            acc
        })
        .reduce(Local::new, |mut a, b| {
            for (k, mut v) in b {
                a.entry(k).or_default().append(&mut v);
            }
            a
        });

    let mut out: Vec<ContratoTotal<'_>> = grupos
        .into_iter()
        .map(|(llave, mut indices)| {
            indices.sort_unstable();
            let importe = suma_sin_faltantes(indices.iter().map(|&i| tabla.fila(i).importe));
            ContratoTotal { llave, importe }
        })
        .collect();
    out.sort_unstable_by(|a, b| a.llave.cmp(&b.llave));
    out
}

/// Intermedios por unidad compradora.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResumenUnidad {
    pub proveedores_distintos:    usize,
    pub procedimientos_distintos: usize,
    /// Suma, sobre procedimientos, de contratos distintos dentro de cada uno.
    pub conteo_contratos:         usize,
    pub monto_total:              f64,
}

pub fn resumen_por_unidad<'a>(contratos: &[ContratoTotal<'a>]) -> BTreeMap<&'a str, ResumenUnidad> {
    #[derive(Default)]
    struct Acum<'a> {
        proveedores:    BTreeSet<&'a str>,
        procedimientos: BTreeSet<&'a str>,
        contratos:      BTreeSet<(&'a str, &'a str)>,
        monto:          f64,
    }

    let mut por_uc: BTreeMap<&'a str, Acum<'a>> = BTreeMap::new();
    for c in contratos {
        let e = por_uc.entry(c.llave.claveuc).or_default();
        e.proveedores.insert(c.llave.proveedor);
        e.procedimientos.insert(c.llave.procedimiento);
        e.contratos.insert((c.llave.procedimiento, c.llave.contrato));
        e.monto += c.importe;
    }

    por_uc
        .into_iter()
        .map(|(uc, a)| {
            (uc, ResumenUnidad {
                proveedores_distintos:    a.proveedores.len(),
                procedimientos_distintos: a.procedimientos.len(),
                conteo_contratos:         a.contratos.len(),
                monto_total:              a.monto,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabla::LineaContrato;

    fn linea(uc: &str, poc: &str, proc_: &str, contrato: &str, tipo: &str, importe: f64) -> LineaContrato {
        LineaContrato {
            dependencia:        "DEP".into(),
            claveuc:            uc.into(),
            proveedor:          poc.into(),
            procedimiento:      proc_.into(),
            contrato:           contrato.into(),
            tipo_procedimiento: tipo.into(),
            importe_pesos:      importe,
        }
    }

    #[test]
    fn suma_partidas_del_mismo_contrato() {
        let t = TablaContratos::desde_lineas([
            linea("U1", "P1", "N1", "C1", "LP", 40.0),
            linea("U1", "P1", "N1", "C1", "LP", 60.0),
            linea("U1", "P2", "N1", "C2", "LP", 0.0),
        ]);
        let c = colapsar_contratos(&t, Agrupacion::PorContrato);
        assert_eq!(c.len(), 2);
        assert_eq!(c[0].llave.contrato, "C1");
        assert_eq!(c[0].importe, 100.0);
        // importe cero se conserva
        assert_eq!(c[1].importe, 0.0);
    }

    #[test]
    fn agrupacion_por_tipo_omite_filas_sin_tipo() {
        let cols = crate::tabla::ColumnasContrato {
            dependencias:   vec![Some("DEP".into()); 2],
            claves_uc:      vec![Some("U1".into()); 2],
            proveedores:    vec![Some("P1".into()); 2],
            procedimientos: vec![Some("N1".into()), Some("N2".into())],
            contratos:      vec![Some("C1".into()), Some("C2".into())],
            tipos:          vec![Some("LP".into()), None],
            importes:       vec![1.0, 2.0],
        };
        let t = TablaContratos::nueva(cols).unwrap();
        assert_eq!(colapsar_contratos(&t, Agrupacion::PorContrato).len(), 2);
        let con_tipo = colapsar_contratos(&t, Agrupacion::PorContratoYTipo);
        assert_eq!(con_tipo.len(), 1);
        assert_eq!(con_tipo[0].llave.tipo, Some("LP"));
    }

    #[test]
    fn resumen_cuenta_contratos_por_procedimiento() {
        let t = TablaContratos::desde_lineas([
            linea("U1", "P1", "N1", "C1", "LP", 10.0),
            linea("U1", "P2", "N1", "C2", "LP", 20.0),
            // mismo codigo de contrato en otro procedimiento cuenta aparte
            linea("U1", "P1", "N2", "C1", "AD", 30.0),
            linea("U2", "P1", "N3", "C9", "AD", 5.0),
        ]);
        let c = colapsar_contratos(&t, Agrupacion::PorContrato);
        let r = resumen_por_unidad(&c);
        let u1 = r["U1"];
        assert_eq!(u1.proveedores_distintos, 2);
        assert_eq!(u1.procedimientos_distintos, 2);
        assert_eq!(u1.conteo_contratos, 3);
        assert_eq!(u1.monto_total, 60.0);
        assert_eq!(r["U2"].conteo_contratos, 1);
    }
}
