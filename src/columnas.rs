// ==============================================================================
// competencia_rust/src/columnas.rs
//
// Mapeo valor de TIPO_PROCEDIMIENTO → nombre de columna de salida.
// Se calcula UNA vez por llamada a partir de los tipos observados:
//
//   "LICITACION PUBLICA"  →  pc_procedimientos_licitacion_publica
//
// Columnas en el orden lexicografico del tipo original. Dos tipos que
// normalizan al mismo nombre comparten columna.
// ==============================================================================

use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const PREFIJO_PROCEDIMIENTOS: &str = "pc_procedimientos_";
pub const PREFIJO_MONTO:          &str = "pc_monto_";

/// Espacios → `_`, todo en minusculas.
pub fn normalizar_tipo(tipo: &str) -> String {
    tipo.replace(' ', "_").to_lowercase()
}

#[derive(Debug, Clone, Default)]
pub struct MapaColumnas<'a> {
    por_tipo: BTreeMap<&'a str, usize>,
    nombres:  Vec<String>,
}

impl<'a> MapaColumnas<'a> {
    pub fn desde_tipos<I>(prefijo: &str, tipos: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let ordenados: BTreeSet<&'a str> = tipos.into_iter().collect();
        let mut por_nombre: HashMap<String, usize> = HashMap::new();
        let mut mapa = MapaColumnas::default();

        for tipo in ordenados {
            let nombre = format!("{prefijo}{}", normalizar_tipo(tipo));
            let siguiente = mapa.nombres.len();
            let idx = *por_nombre.entry(nombre.clone()).or_insert(siguiente);
            if idx == siguiente {
                mapa.nombres.push(nombre);
            }
            mapa.por_tipo.insert(tipo, idx);
        }
        mapa
    }

    pub fn indice(&self, tipo: &str) -> Option<usize> {
        self.por_tipo.get(tipo).copied()
    }

    pub fn nombres(&self) -> &[String] {
        &self.nombres
    }

    pub fn len(&self) -> usize {
        self.nombres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nombres.is_empty()
    }
}
