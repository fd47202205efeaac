// ============================================================================
// Formatage des nombres pour l'affichage
// ============================================================================

/// Formate un nombre avec séparateur de milliers : 42195.5 → "42,195.50"
///
/// CONCEPT RUST : Manipulation de chaînes
/// - format! produit les décimales
/// - On insère les virgules sur la partie entière, de droite à gauche
pub fn thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }

    let formatted = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    // "-0.00" n'a pas de sens à l'affichage
    let sign = if value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };

    match fraction {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// Prix en dollars : "$42,195.50"
pub fn usd(value: f64) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    format!("${}", thousands(value, 2))
}

/// Variation signée avec flèche : "▲ +1.25%"
pub fn change(pct: f64) -> String {
    let arrow = if pct >= 0.0 { "▲" } else { "▼" };
    format!("{} {:+.2}%", arrow, pct)
}
