// ==============================================================================
// competencia_rust/src/feature.rs
//
// Tabla de salida de una feature: una fila por CLAVEUC (orden ascendente),
// columnas f64 con nombre. Los valores pueden ser NaN/inf.
// ==============================================================================

pub const COLUMNA_CLAVEUC: &str = "CLAVEUC";

#[derive(Debug, Clone)]
pub struct FilaFeature {
    pub claveuc: String,
    pub valores: Vec<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct TablaFeature {
    columnas: Vec<String>,
    filas:    Vec<FilaFeature>,
}

impl TablaFeature {
    pub fn nueva<S: Into<String>>(columnas: impl IntoIterator<Item = S>) -> Self {
        TablaFeature {
            columnas: columnas.into_iter().map(Into::into).collect(),
            filas:    Vec::new(),
        }
    }

    /// Las filas deben llegar en orden ascendente de CLAVEUC.
    pub fn agregar(&mut self, claveuc: impl Into<String>, valores: Vec<f64>) {
        assert_eq!(
            valores.len(),
            self.columnas.len(),
            "fila con {} valores para {} columnas",
            valores.len(),
            self.columnas.len()
        );
        let claveuc = claveuc.into();
        assert!(
            self.filas.last().map_or(true, |f| f.claveuc < claveuc),
            "CLAVEUC fuera de orden o repetida: {claveuc}"
        );
        self.filas.push(FilaFeature { claveuc, valores });
    }

    pub fn columnas(&self) -> &[String] {
        &self.columnas
    }

    pub fn filas(&self) -> &[FilaFeature] {
        &self.filas
    }

    pub fn len(&self) -> usize {
        self.filas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filas.is_empty()
    }

    pub fn claves(&self) -> impl Iterator<Item = &str> + '_ {
        self.filas.iter().map(|f| f.claveuc.as_str())
    }

    pub fn indice_columna(&self, nombre: &str) -> Option<usize> {
        self.columnas.iter().position(|c| c == nombre)
    }

    pub fn fila(&self, claveuc: &str) -> Option<&FilaFeature> {
        self.filas
            .binary_search_by(|f| f.claveuc.as_str().cmp(claveuc))
            .ok()
            .map(|i| &self.filas[i])
    }

    pub fn valor(&self, claveuc: &str, columna: &str) -> Option<f64> {
        let j = self.indice_columna(columna)?;
        self.fila(claveuc).map(|f| f.valores[j])
    }

    /// Valores de una columna en el orden de las filas.
    pub fn columna(&self, nombre: &str) -> Option<Vec<f64>> {
        let j = self.indice_columna(nombre)?;
        Some(self.filas.iter().map(|f| f.valores[j]).collect())
    }
}
