// ==============================================================================
// competencia_rust/src/python.rs
//
// Superficie PyO3 (feature "python").
//
//   Contratos(dependencia, claveuc, proveedor, procedimiento, contrato,
//             tipo, importe)              → snapshot inmutable desde listas
//   Contratos.desde_parquet(bytes)        → idem desde parquet (gz/zstd/plano)
//   .contratos_por_proveedor() ... .calcular_IHH_ID_monto()
//   .todas() / .matriz(imputar=None)
//
// Cada feature devuelve un dict de columnas {"CLAVEUC": [...], col: [...]},
// listo para pandas.DataFrame(dict). El calculo corre sin el GIL.
// ==============================================================================

use std::sync::Arc;

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyDict, PyFloat, PyList};

use crate::carga::{cargar_parquet, EsquemaColumnas};
use crate::error::Error;
use crate::feature::{TablaFeature, COLUMNA_CLAVEUC};
use crate::features;
use crate::matriz::{calcular_todas, MatrizFeatures};
use crate::tabla::{ColumnasContrato, TablaContratos};

const MAX_ENTERO_EXACTO: f64 = 9_007_199_254_740_992.0; // 2^53

fn a_py_err(e: Error) -> PyErr {
    match e {
        Error::LongitudesDistintas { .. }
        | Error::ColumnaFaltante(_)
        | Error::TipoColumna { .. }
        | Error::ColumnaDuplicada(_) => PyValueError::new_err(e.to_string()),
        _ => PyRuntimeError::new_err(e.to_string()),
    }
}

// Columnas de pandas con faltantes llegan como float: NaN → nulo,
// 1001.0 → "1001". Cualquier otro float no es una llave valida.
fn extract_texto(list: &Bound<'_, PyList>) -> PyResult<Vec<Option<String>>> {
    list.iter().map(|item| {
        if item.is_none() { return Ok(None); }
        let Ok(flotante) = item.downcast::<PyFloat>() else {
            return item.extract::<String>()
                .or_else(|_| item.extract::<i64>().map(|i| i.to_string()))
                .map(Some);
        };
        let f = flotante.value();
        if f.is_nan() {
            Ok(None)
        } else if f.fract() == 0.0 && f.abs() <= MAX_ENTERO_EXACTO {
            Ok(Some((f as i64).to_string()))
        } else {
            Err(PyValueError::new_err(format!("llave no entera: {f}")))
        }
    }).collect()
}

fn extract_f64(list: &Bound<'_, PyList>) -> PyResult<Vec<f64>> {
    list.iter().map(|item| {
        if item.is_none() { Ok(f64::NAN) }
        else { item.extract::<f64>() }
    }).collect()
}

fn a_dict(py: Python<'_>, tabla: &TablaFeature) -> PyResult<PyObject> {
    let dict = PyDict::new_bound(py);
    dict.set_item(COLUMNA_CLAVEUC, tabla.claves().collect::<Vec<&str>>())?;
    for (j, col) in tabla.columnas().iter().enumerate() {
        let valores: Vec<f64> = tabla.filas().iter().map(|f| f.valores[j]).collect();
        dict.set_item(col, valores)?;
    }
    Ok(dict.into_any().unbind())
}

#[pyclass(name = "Contratos", frozen)]
struct Contratos {
    tabla: Arc<TablaContratos>,
}

impl Contratos {
    fn feature(&self, py: Python<'_>, f: fn(&TablaContratos) -> TablaFeature) -> PyResult<PyObject> {
        let tabla = Arc::clone(&self.tabla);
        let out = py.allow_threads(move || f(&tabla));
        a_dict(py, &out)
    }
}

#[pymethods]
impl Contratos {
    #[new]
    fn new(
        dependencia:   &Bound<'_, PyList>,
        claveuc:       &Bound<'_, PyList>,
        proveedor:     &Bound<'_, PyList>,
        procedimiento: &Bound<'_, PyList>,
        contrato:      &Bound<'_, PyList>,
        tipo:          &Bound<'_, PyList>,
        importe:       &Bound<'_, PyList>,
    ) -> PyResult<Self> {
        let cols = ColumnasContrato {
            dependencias:   extract_texto(dependencia)?,
            claves_uc:      extract_texto(claveuc)?,
            proveedores:    extract_texto(proveedor)?,
            procedimientos: extract_texto(procedimiento)?,
            contratos:      extract_texto(contrato)?,
            tipos:          extract_texto(tipo)?,
            importes:       extract_f64(importe)?,
        };
        let tabla = TablaContratos::nueva(cols).map_err(a_py_err)?;
        Ok(Contratos { tabla: Arc::new(tabla) })
    }

    #[staticmethod]
    fn desde_parquet(py: Python<'_>, data: &Bound<'_, PyBytes>) -> PyResult<Self> {
        let raw = data.as_bytes().to_vec();
        let tabla = py
            .allow_threads(move || cargar_parquet(&raw, &EsquemaColumnas::default()))
            .map_err(a_py_err)?;
        Ok(Contratos { tabla: Arc::new(tabla) })
    }

    fn __len__(&self) -> usize {
        self.tabla.len()
    }

    #[getter]
    fn descartadas(&self) -> usize {
        self.tabla.descartadas()
    }

    fn contratos_por_proveedor(&self, py: Python<'_>) -> PyResult<PyObject> {
        self.feature(py, features::contratos_por_proveedor)
    }

    fn porcentaje_procedimientos_por_tipo(&self, py: Python<'_>) -> PyResult<PyObject> {
        self.feature(py, features::porcentaje_procedimientos_por_tipo)
    }

    fn porcentaje_monto_tipo_procedimiento(&self, py: Python<'_>) -> PyResult<PyObject> {
        self.feature(py, features::porcentaje_monto_tipo_procedimiento)
    }

    fn importe_promedio_por_contrato(&self, py: Python<'_>) -> PyResult<PyObject> {
        self.feature(py, features::importe_promedio_por_contrato)
    }

    #[pyo3(name = "calcular_IHH_ID_contratos")]
    fn calcular_ihh_id_contratos(&self, py: Python<'_>) -> PyResult<PyObject> {
        self.feature(py, features::calcular_ihh_id_contratos)
    }

    #[pyo3(name = "calcular_IHH_ID_monto")]
    fn calcular_ihh_id_monto(&self, py: Python<'_>) -> PyResult<PyObject> {
        self.feature(py, features::calcular_ihh_id_monto)
    }

    fn todas(&self, py: Python<'_>) -> PyResult<Vec<PyObject>> {
        let tabla = Arc::clone(&self.tabla);
        let tablas = py.allow_threads(move || calcular_todas(&tabla));
        tablas.iter().map(|t| a_dict(py, t)).collect()
    }

    #[pyo3(signature = (imputar=None))]
    fn matriz(&self, py: Python<'_>, imputar: Option<f64>) -> PyResult<PyObject> {
        let tabla = Arc::clone(&self.tabla);
        let mut m = py
            .allow_threads(move || MatrizFeatures::desde_contratos(&tabla))
            .map_err(a_py_err)?;
        if let Some(valor) = imputar {
            m = m.imputar_no_finitos(valor);
        }
        a_dict(py, m.tabla())
    }
}

// ===========================================================================
// MÓDULO PyO3
// ===========================================================================
#[pymodule]
fn competencia_rust(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Contratos>()?;
    Ok(())
}
