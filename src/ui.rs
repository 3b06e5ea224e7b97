//! Interface de terminal do Consentor — spinners e saída colorida.
//!
//! Usa as crates `indicatif` para o spinner de progresso e `console` para
//! estilização com cores. O [`DrainProgress`] acompanha visualmente o
//! esvaziamento da fila de eventos no terminal.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::intake::{Delivery, IntakeReport};
use crate::state_machine::ConsentRecord;

/// Indicador visual de progresso para o processamento da fila de eventos.
///
/// Exibe um spinner animado durante o consumo e, ao final, uma linha
/// colorida por entrega: verde para transições, amarelo para entregas
/// toleradas, vermelho para defeitos.
pub struct DrainProgress {
    // Barra de progresso/spinner do indicatif.
    pb: ProgressBar,
    // Estilo verde para transições persistidas.
    green: Style,
    // Estilo vermelho para defeitos.
    red: Style,
    // Estilo amarelo para entregas toleradas.
    yellow: Style,
}

impl DrainProgress {
    /// Inicia o spinner informando quantos eventos serão consumidos.
    pub fn start(count: usize) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("invalid template"),
        );
        pb.set_message(format!("Processing {count} consent events..."));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Finaliza e limpa o spinner.
    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }

    /// Exibe o resultado de uma entrega individual.
    pub fn delivery(&self, delivery: &Delivery) {
        match delivery {
            Delivery::Transitioned {
                consent_id,
                from,
                to,
            } => {
                println!(
                    "  {} {consent_id}: {from} → {to}",
                    self.green.apply_to("✓")
                );
            }
            Delivery::Unchanged { consent_id } => {
                println!("  · {consent_id}: no applicable transition");
            }
            Delivery::Dropped { consent_id, reason } => {
                println!(
                    "  {} {consent_id}: dropped ({reason})",
                    self.yellow.apply_to("↷")
                );
            }
            Delivery::Failed { consent_id, reason } => {
                println!("  {} {consent_id}: {reason}", self.red.apply_to("✗"));
            }
        }
    }

    /// Imprime o resumo final do consumo da fila.
    pub fn summary(&self, report: &IntakeReport) {
        println!();
        println!(
            "{} transitioned, {} unchanged, {} dropped, {} failed",
            self.green.apply_to(report.transitioned()),
            report.unchanged(),
            self.yellow.apply_to(report.dropped()),
            self.red.apply_to(report.failed()),
        );
    }
}

/// Lista os consentimentos armazenados com estado e carimbos de tempo.
pub fn print_records(records: &[ConsentRecord]) {
    if records.is_empty() {
        println!("No consents stored.");
        return;
    }

    let bold = Style::new().bold();
    println!("{}", bold.apply_to("─── Stored Consents ───"));
    for record in records {
        println!(
            "  {}  {}  created {}  expires {}  updated {}",
            bold.apply_to(&record.consent_id),
            record.state,
            record.created_at.format("%Y-%m-%d %H:%M:%S"),
            record.expires_at.format("%Y-%m-%d %H:%M:%S"),
            record.updated_at.format("%Y-%m-%d %H:%M:%S"),
        );
    }
}
