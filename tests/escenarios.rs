use std::io::Write;
use std::sync::Arc;

use arrow_array::types::Int32Type;
use arrow_array::{
    ArrayRef, BooleanArray, DictionaryArray, Float64Array, Int64Array, RecordBatch, StringArray,
};
use arrow_schema::{DataType, Field, Schema};
use competencia_rust::features::{
    CONTRATOS_POR_PROVEEDOR, IHH_TOTAL_CONTRATOS, IHH_TOTAL_MONTO, ID_TOTAL_MONTO,
    MONTO_CONTRATO_PROMEDIO,
};
use competencia_rust::{
    calcular_ihh_id_monto, calcular_todas, cargar_parquet,
    contratos_por_proveedor, importe_promedio_por_contrato, porcentaje_procedimientos_por_tipo,
    EsquemaColumnas, Error, LineaContrato, MatrizFeatures, TablaContratos,
};
use parquet::arrow::ArrowWriter;

fn linea(uc: &str, poc: &str, proc_: &str, contrato: &str, tipo: &str, importe: f64) -> LineaContrato {
    LineaContrato {
        dependencia:        "SECRETARIA".into(),
        claveuc:            uc.into(),
        proveedor:          poc.into(),
        procedimiento:      proc_.into(),
        contrato:           contrato.into(),
        tipo_procedimiento: tipo.into(),
        importe_pesos:      importe,
    }
}

#[test]
fn ihh_monto_dos_proveedores() {
    let t = TablaContratos::desde_lineas([
        linea("U1", "P1", "N1", "C1", "LICITACION PUBLICA", 100.0),
        linea("U1", "P2", "N2", "C2", "LICITACION PUBLICA", 300.0),
    ]);
    let f = calcular_ihh_id_monto(&t);
    assert_eq!(f.len(), 1);
    assert_eq!(f.valor("U1", IHH_TOTAL_MONTO), Some(6250.0));
    // ID = (100*5625/6250)^2 + (100*625/6250)^2 = 8100 + 100
    let id = f.valor("U1", ID_TOTAL_MONTO).unwrap();
    assert!((id - 8200.0).abs() < 1e-6, "{id}");
}

#[test]
fn tres_contratos_dos_proveedores() {
    let t = TablaContratos::desde_lineas([
        linea("U1", "P1", "N1", "C1", "ADJUDICACION DIRECTA", 10.0),
        linea("U1", "P1", "N1", "C2", "ADJUDICACION DIRECTA", 20.0),
        // partida extra del mismo contrato: no es un contrato nuevo
        linea("U1", "P2", "N2", "C3", "LICITACION PUBLICA", 5.0),
        linea("U1", "P2", "N2", "C3", "LICITACION PUBLICA", 5.0),
    ]);
    let f = contratos_por_proveedor(&t);
    assert_eq!(f.valor("U1", CONTRATOS_POR_PROVEEDOR), Some(1.5));

    let p = importe_promedio_por_contrato(&t);
    assert_eq!(p.valor("U1", MONTO_CONTRATO_PROMEDIO), Some(40.0 / 3.0));
}

#[test]
fn tabla_vacia_no_produce_filas() {
    let t = TablaContratos::desde_lineas(Vec::new());
    for f in calcular_todas(&t) {
        assert!(f.is_empty());
    }
}

#[test]
fn tipos_se_derivan_de_los_datos() {
    let t = TablaContratos::desde_lineas([
        linea("U1", "P1", "N1", "C1", "Invitacion a cuando menos 3 personas", 1.0),
        linea("U2", "P1", "N2", "C2", "Otro", 1.0),
    ]);
    let f = porcentaje_procedimientos_por_tipo(&t);
    assert_eq!(
        f.columnas(),
        [
            "pc_procedimientos_invitacion_a_cuando_menos_3_personas",
            "pc_procedimientos_otro",
        ]
    );
}

#[test]
fn matriz_une_las_seis_features() {
    let t = TablaContratos::desde_lineas([
        linea("U1", "P1", "N1", "C1", "LP", 100.0),
        linea("U1", "P2", "N2", "C2", "AD", 300.0),
        linea("U2", "P3", "N3", "C3", "AD", 0.0),
    ]);
    let m = MatrizFeatures::desde_contratos(&t).unwrap();
    let tabla = m.tabla();
    assert_eq!(tabla.claves().collect::<Vec<_>>(), ["U1", "U2"]);
    assert_eq!(tabla.valor("U1", IHH_TOTAL_MONTO), Some(6250.0));
    assert_eq!(tabla.valor("U2", IHH_TOTAL_CONTRATOS), Some(10_000.0));
    // U2 no tiene monto: no finito, se conserva
    assert!(tabla.valor("U2", IHH_TOTAL_MONTO).unwrap().is_nan());
    assert!(tabla.valor("U2", "pc_monto_ad").unwrap().is_nan());

    let imputada = m.imputar_no_finitos(0.0);
    assert_eq!(imputada.tabla().valor("U2", IHH_TOTAL_MONTO), Some(0.0));
}

// ---------------------------------------------------------------------------
// Carga desde parquet
// ---------------------------------------------------------------------------

fn parquet_de(columnas: Vec<(&str, ArrayRef)>) -> Vec<u8> {
    let fields: Vec<Field> = columnas
        .iter()
        .map(|(n, a)| Field::new(*n, a.data_type().clone(), true))
        .collect();
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(
        schema.clone(),
        columnas.into_iter().map(|(_, a)| a).collect(),
    )
    .unwrap();

    let mut buf = Vec::new();
    let mut w = ArrowWriter::try_new(&mut buf, schema, None).unwrap();
    w.write(&batch).unwrap();
    w.close().unwrap();
    buf
}

fn texto(v: Vec<Option<&str>>) -> ArrayRef {
    Arc::new(StringArray::from(v))
}

fn contratos_parquet(importe: ArrayRef) -> Vec<(&'static str, ArrayRef)> {
    let tipos: DictionaryArray<Int32Type> =
        vec![Some("LP"), Some("LP"), Some("AD"), Some("AD")].into_iter().collect();
    vec![
        ("DEPENDENCIA", texto(vec![Some("SEP"), Some("SEP"), Some("SEP"), Some("SEP")])),
        ("CLAVEUC", Arc::new(Int64Array::from(vec![Some(1001), Some(1001), Some(1001), None])) as ArrayRef),
        ("PROVEEDOR_CONTRATISTA", texto(vec![Some("P1"), Some("P1"), Some("P2"), Some("P2")])),
        ("NUMERO_PROCEDIMIENTO", texto(vec![Some("N1"), Some("N1"), Some("N2"), Some("N3")])),
        ("CODIGO_CONTRATO", texto(vec![Some("C1"), Some("C1"), Some("C2"), Some("C3")])),
        ("TIPO_PROCEDIMIENTO", Arc::new(tipos) as ArrayRef),
        ("IMPORTE_PESOS", importe),
    ]
}

#[test]
fn carga_parquet_gzip() {
    let importe: ArrayRef =
        Arc::new(Float64Array::from(vec![Some(100.0), None, Some(300.0), Some(7.0)]));
    let plano = parquet_de(contratos_parquet(importe));

    let mut enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    enc.write_all(&plano).unwrap();
    let gz = enc.finish().unwrap();

    let t = cargar_parquet(&gz, &EsquemaColumnas::default()).unwrap();
    assert_eq!(t.len(), 3);
    assert_eq!(t.descartadas(), 1);
    assert_eq!(t.fila(0).claveuc, "1001");
    assert_eq!(t.fila(2).tipo, Some("AD"));

    // la partida nula suma 0 al contrato C1
    let f = calcular_ihh_id_monto(&t);
    assert_eq!(f.valor("1001", IHH_TOTAL_MONTO), Some(6250.0));
    assert_eq!(contratos_por_proveedor(&t).valor("1001", CONTRATOS_POR_PROVEEDOR), Some(1.0));
}

#[test]
fn esquema_con_nombres_propios() {
    let importe: ArrayRef = Arc::new(Float64Array::from(vec![1.0, 2.0, 3.0, 4.0]));
    let mut cols = contratos_parquet(importe);
    cols[6].0 = "MONTO";
    let datos = parquet_de(cols);

    let esquema = EsquemaColumnas { importe_pesos: "MONTO".into(), ..Default::default() };
    assert_eq!(cargar_parquet(&datos, &esquema).unwrap().len(), 3);

    match cargar_parquet(&datos, &EsquemaColumnas::default()) {
        Err(Error::ColumnaFaltante(c)) => assert_eq!(c, "IMPORTE_PESOS"),
        otro => panic!("se esperaba ColumnaFaltante, se obtuvo {otro:?}"),
    }
}

#[test]
fn importe_de_tipo_no_soportado() {
    let importe: ArrayRef = Arc::new(BooleanArray::from(vec![true, false, true, false]));
    let datos = parquet_de(contratos_parquet(importe));
    match cargar_parquet(&datos, &EsquemaColumnas::default()) {
        Err(Error::TipoColumna { columna, .. }) => assert_eq!(columna, "IMPORTE_PESOS"),
        otro => panic!("se esperaba TipoColumna, se obtuvo {otro:?}"),
    }
}

#[test]
fn bytes_que_no_son_parquet() {
    assert!(matches!(
        cargar_parquet(b"no es parquet", &EsquemaColumnas::default()),
        Err(Error::Parquet(_))
    ));
}
