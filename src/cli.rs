//! Interface de linha de comando do Consentor baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (save, event, status,
//! demo) e flags globais (--store, --verbose).

use clap::{Parser, Subcommand, ValueEnum};

use crate::state_machine::ConsentState;

/// Consentor — Motor de transições de estado de consentimentos.
#[derive(Debug, Parser)]
#[command(name = "consentor", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho do arquivo de armazenamento (sobrepõe a configuração).
    #[arg(long, global = true)]
    pub store: Option<String>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Estado inicial aceito na criação de um consentimento.
///
/// Apenas os dois estados não-terminais podem ser atribuídos na criação;
/// `REJECTED` e `EXPIRED` só são alcançados por transição do motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InitialStateArg {
    /// Consentimento já autorizado, sujeito a expiração.
    Authorised,
    /// Consentimento aguardando autorização, sujeito a rejeição.
    AwaitingAuthorisation,
}

impl From<InitialStateArg> for ConsentState {
    fn from(arg: InitialStateArg) -> Self {
        match arg {
            InitialStateArg::Authorised => ConsentState::Authorised,
            InitialStateArg::AwaitingAuthorisation => ConsentState::AwaitingAuthorisation,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Insere um consentimento no armazenamento.
    Save {
        /// Identificador de negócio do consentimento.
        consent_id: String,

        /// Estado inicial do consentimento.
        #[arg(long, value_enum)]
        state: Option<InitialStateArg>,

        /// Minutos até a expiração (sobrepõe a configuração).
        #[arg(long)]
        ttl_minutes: Option<i64>,
    },

    /// Publica consentIds na fila de entrada e processa as transições.
    Event {
        /// Identificadores a processar, na ordem de entrega.
        #[arg(required = true)]
        consent_ids: Vec<String>,
    },

    /// Lista os consentimentos armazenados com seus estados.
    Status,

    /// Executa a demonstração embutida do ciclo de vida de consentimentos.
    Demo,
}
