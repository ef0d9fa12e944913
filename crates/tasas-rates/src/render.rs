//! Markdown renderings of reports and status for the chat collaborator.

use tasas_models::quote::Quote;
use tasas_models::report::{Direction, RateReport};
use tasas_models::status::StatusSnapshot;

use crate::error::AggregationError;

/// Marker appended to labels of derived estimates.
pub const ESTIMATE_MARKER: &str = "(estimado)";

/// Escape the characters Telegram's legacy Markdown treats as entity markers.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Display label for a quote, marking derived estimates.
///
/// Labels may come from remote payloads, so they are escaped.
pub fn quote_label(quote: &Quote) -> String {
    let label = escape_markdown(&quote.label);
    if quote.estimate {
        format!("{label} {ESTIMATE_MARKER}")
    } else {
        label
    }
}

pub fn report_markdown(report: &RateReport) -> String {
    let mut out = format!(
        "💱 *Tasas del dólar hoy* ({})\n\n🇻🇪 BCV: {:.2} Bs\n",
        report.generated_at.format("%d-%m-%Y"),
        report.official_price
    );

    for quote in &report.quotes {
        out.push_str(&format!("💸 {}: {:.2} Bs\n", quote_label(quote), quote.price));
    }
    out.push_str(&format!("\n📊 Promedio general: {:.2} Bs\n", report.usd_average));

    if !report.eur_quotes.is_empty() {
        out.push_str("\n💶 *Euro*\n");
        for quote in &report.eur_quotes {
            out.push_str(&format!("💶 {}: {:.2} Bs\n", quote_label(quote), quote.price));
        }
    }

    if let Some(change) = &report.change {
        let verb = match change.direction {
            Direction::Up => "📈 Subió",
            Direction::Down => "📉 Bajó",
        };
        out.push_str(&format!(
            "\n⚠️ {verb} {:.2}% respecto a la tasa anterior.\n",
            change.magnitude_pct
        ));
    }

    if report.has_estimates() {
        out.push_str(&format!(
            "\n_{ESTIMATE_MARKER}: calculado a partir de la tasa BCV._"
        ));
    }

    out.trim_end().to_string()
}

/// Short user-facing message for a failed report. No internals beyond the error line.
pub fn failure_markdown(error: &AggregationError) -> String {
    match error {
        // A backtick inside the code span would end it early.
        AggregationError::PrimarySourceUnavailable(e) => format!(
            "❌ No se pudo obtener la tasa oficial (BCV). Intenta de nuevo más tarde.\n`{}`",
            e.to_string().replace('`', "'")
        ),
    }
}

pub fn status_markdown(status: &StatusSnapshot) -> String {
    let last_update = status
        .last_update
        .map(|t| t.format("%d-%m-%Y %H:%M").to_string())
        .unwrap_or_else(|| "Aún no actualizada".to_string());
    let scheduler = if status.scheduler_running {
        "✅ Activo"
    } else {
        "❌ Inactivo"
    };

    let mut out = format!(
        "📡 *Estado del Bot*\n\nÚltima actualización: {last_update}\nScheduler: {scheduler}\nChat ID: {}\n",
        status.chat_id
    );

    if let Some(rates) = &status.last_rates {
        out.push_str(&format!(
            "BCV: {:.2} Bs | Promedio: {:.2} Bs\n",
            rates.bcv, rates.promedio
        ));
    }

    out.trim_end().to_string()
}
