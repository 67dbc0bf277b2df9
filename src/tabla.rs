// ==============================================================================
// competencia_rust/src/tabla.rs
//
// Tabla de entrada: una fila por PARTIDA de contrato (un contrato puede venir
// partido en varias filas con su propio IMPORTE_PESOS).
//
// Se guarda por columnas, igual que los datos crudos de un periodo:
//   dependencias / claves_uc / proveedores / procedimientos / contratos
//   tipos (nullable) / importes (NaN = faltante)
//
// Filas con una llave nula (cualquiera de las 5 primeras columnas) no pueden
// participar en ningun agrupamiento; se descartan al construir la tabla.
// ==============================================================================

use tracing::warn;

use crate::error::{Error, Result};

/// Una partida de contrato ya validada.
#[derive(Debug, Clone, PartialEq)]
pub struct LineaContrato {
    pub dependencia:        String,
    pub claveuc:            String,
    pub proveedor:          String,
    pub procedimiento:      String,
    pub contrato:           String,
    pub tipo_procedimiento: String,
    pub importe_pesos:      f64,
}

/// Columnas crudas tal como llegan de parquet o de Python.
///
/// Todas deben tener la misma longitud; `None` representa un nulo.
#[derive(Debug, Clone, Default)]
pub struct ColumnasContrato {
    pub dependencias:   Vec<Option<String>>,
    pub claves_uc:      Vec<Option<String>>,
    pub proveedores:    Vec<Option<String>>,
    pub procedimientos: Vec<Option<String>>,
    pub contratos:      Vec<Option<String>>,
    pub tipos:          Vec<Option<String>>,
    pub importes:       Vec<f64>,
}

/// Snapshot inmutable de la tabla de contratos.
#[derive(Debug, Clone, Default)]
pub struct TablaContratos {
    n:              usize,
    dependencias:   Vec<String>,
    claves_uc:      Vec<String>,
    proveedores:    Vec<String>,
    procedimientos: Vec<String>,
    contratos:      Vec<String>,
    tipos:          Vec<Option<String>>,
    importes:       Vec<f64>,
    descartadas:    usize,
}

/// Vista prestada de una fila.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fila<'a> {
    pub dependencia:   &'a str,
    pub claveuc:       &'a str,
    pub proveedor:     &'a str,
    pub procedimiento: &'a str,
    pub contrato:      &'a str,
    pub tipo:          Option<&'a str>,
    pub importe:       f64,
}

impl TablaContratos {
    pub fn nueva(cols: ColumnasContrato) -> Result<Self> {
        let n = cols.claves_uc.len();
        let largos = [
            ("DEPENDENCIA",           cols.dependencias.len()),
            ("PROVEEDOR_CONTRATISTA", cols.proveedores.len()),
            ("NUMERO_PROCEDIMIENTO",  cols.procedimientos.len()),
            ("CODIGO_CONTRATO",       cols.contratos.len()),
            ("TIPO_PROCEDIMIENTO",    cols.tipos.len()),
            ("IMPORTE_PESOS",         cols.importes.len()),
        ];
        if let Some(&(columna, obtenido)) = largos.iter().find(|(_, l)| *l != n) {
            return Err(Error::LongitudesDistintas { columna, esperado: n, obtenido });
        }

        let mut tabla = TablaContratos {
            dependencias:   Vec::with_capacity(n),
            claves_uc:      Vec::with_capacity(n),
            proveedores:    Vec::with_capacity(n),
            procedimientos: Vec::with_capacity(n),
            contratos:      Vec::with_capacity(n),
            tipos:          Vec::with_capacity(n),
            importes:       Vec::with_capacity(n),
            ..Default::default()
        };

        let filas = cols
            .dependencias.into_iter()
            .zip(cols.claves_uc)
            .zip(cols.proveedores)
            .zip(cols.procedimientos)
            .zip(cols.contratos)
            .zip(cols.tipos)
            .zip(cols.importes);

        for ((((((dep, uc), poc), proc_), contrato), tipo), importe) in filas {
            match (dep, uc, poc, proc_, contrato) {
                (Some(dep), Some(uc), Some(poc), Some(proc_), Some(contrato)) => {
                    tabla.dependencias.push(dep);
                    tabla.claves_uc.push(uc);
                    tabla.proveedores.push(poc);
                    tabla.procedimientos.push(proc_);
                    tabla.contratos.push(contrato);
                    tabla.tipos.push(tipo);
                    tabla.importes.push(importe);
                }
                _ => tabla.descartadas += 1,
            }
        }
        tabla.n = tabla.claves_uc.len();

        if tabla.descartadas > 0 {
            warn!(
                descartadas = tabla.descartadas,
                filas = tabla.n,
                "filas con llave nula descartadas"
            );
        }
        Ok(tabla)
    }

    pub fn desde_lineas<I>(lineas: I) -> Self
    where
        I: IntoIterator<Item = LineaContrato>,
    {
        let mut t = TablaContratos::default();
        for l in lineas {
            t.dependencias.push(l.dependencia);
            t.claves_uc.push(l.claveuc);
            t.proveedores.push(l.proveedor);
            t.procedimientos.push(l.procedimiento);
            t.contratos.push(l.contrato);
            t.tipos.push(Some(l.tipo_procedimiento));
            t.importes.push(l.importe_pesos);
        }
        t.n = t.claves_uc.len();
        t
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Filas descartadas por tener alguna llave nula.
    pub fn descartadas(&self) -> usize {
        self.descartadas
    }

    pub fn fila(&self, i: usize) -> Fila<'_> {
        Fila {
            dependencia:   &self.dependencias[i],
            claveuc:       &self.claves_uc[i],
            proveedor:     &self.proveedores[i],
            procedimiento: &self.procedimientos[i],
            contrato:      &self.contratos[i],
            tipo:          self.tipos[i].as_deref(),
            importe:       self.importes[i],
        }
    }

    pub fn filas(&self) -> impl Iterator<Item = Fila<'_>> + '_ {
        (0..self.n).map(move |i| self.fila(i))
    }
}
