// ==============================================================================
// competencia_rust/src/aritmetica.rs
//
// Division tolerante a cero. Una unidad sin actividad es un caso valido: el
// resultado es NaN (0/0) o +-inf (x/0), nunca un error ni un panic.
// ==============================================================================

/// `num / den` con el centinela no finito explicito cuando `den == 0`.
///
/// El signo del infinito respeta el signo del cero (`3 / -0 = -inf`).
#[inline]
pub fn dividir(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        if num == 0.0 || num.is_nan() {
            f64::NAN
        } else {
            f64::INFINITY.copysign(num) * 1f64.copysign(den)
        }
    } else {
        num / den
    }
}

/// `parte * 100 / total`.
#[inline]
pub fn porcentaje(parte: f64, total: f64) -> f64 {
    dividir(parte * 100.0, total)
}

/// Suma que ignora faltantes (NaN aporta 0).
pub fn suma_sin_faltantes<I: IntoIterator<Item = f64>>(valores: I) -> f64 {
    valores.into_iter().filter(|v| !v.is_nan()).sum()
}
