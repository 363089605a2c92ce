use super::form::QuoteForm;
use super::QuoterApp;
use crate::adapters::storage::load_image;
use crate::core::updater::{UpdateReport, UPDATE_SUCCESS_MESSAGE};
use crate::domain::model::PlanId;
use crate::domain::ports::{PriceExtractor, Storage};
use crate::utils::error::{QuoterError, Result};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;

const HELP: &str = "\
Comandos:
  aportes <monto>      aportes del afiliado (máx. 7 caracteres)
  edad <años>          edad del afiliado (máx. 2 caracteres)
  plan <plan>          200, 300, 400, 500 o 'por aportes'
  cotizar              calcula la cotización
  actualizar <imagen>  actualiza los precios desde una imagen PNG/JPEG
  precios              muestra la tabla de precios
  estado               muestra los datos cargados
  ayuda                muestra esta ayuda
  salir                termina la sesión";

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Aportes(String),
    Edad(String),
    Plan(PlanId),
    Cotizar,
    Actualizar(String),
    Precios,
    Estado,
    Ayuda,
    Salir,
}

impl SessionCommand {
    /// `Ok(None)` for blank lines.
    pub fn parse(line: &str) -> std::result::Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "aportes" => SessionCommand::Aportes(rest.to_string()),
            "edad" => SessionCommand::Edad(rest.to_string()),
            "plan" => SessionCommand::Plan(rest.parse::<PlanId>().map_err(|e| e.to_string())?),
            "cotizar" => SessionCommand::Cotizar,
            "actualizar" if !rest.is_empty() => SessionCommand::Actualizar(rest.to_string()),
            "actualizar" => return Err("Indique la imagen: actualizar <archivo>".to_string()),
            "precios" => SessionCommand::Precios,
            "estado" => SessionCommand::Estado,
            "ayuda" | "help" | "?" => SessionCommand::Ayuda,
            "salir" | "exit" | "quit" => SessionCommand::Salir,
            other => return Err(format!("Comando desconocido: {} (escriba 'ayuda')", other)),
        };

        Ok(Some(command))
    }
}

type PendingUpdate = JoinHandle<Result<UpdateReport>>;

async fn wait_pending(pending: &mut Option<PendingUpdate>) -> Result<UpdateReport> {
    match pending.as_mut() {
        Some(handle) => handle.await.unwrap_or_else(|e| {
            Err(QuoterError::extraction_failed(QuoterError::IoError(
                std::io::Error::other(e.to_string()),
            )))
        }),
        None => std::future::pending().await,
    }
}

fn report_update<W: Write>(out: &mut W, outcome: Result<UpdateReport>) -> Result<()> {
    match outcome {
        Ok(report) => {
            writeln!(out, "{}", UPDATE_SUCCESS_MESSAGE)?;
            if !report.missing_cells.is_empty() {
                writeln!(
                    out,
                    "Atención: {} precios no se pudieron leer de la imagen.",
                    report.missing_cells.len()
                )?;
            }
        }
        Err(e) => writeln!(out, "{}", e.user_friendly_message())?,
    }
    Ok(())
}

impl<E, S> QuoterApp<E, S>
where
    E: PriceExtractor + 'static,
    S: Storage,
{
    /// Reads commands from `input` until EOF or `salir`. Price updates run in
    /// the background; quoting stays available while one is pending.
    pub async fn run_session<R, W>(&self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut form = QuoteForm::default();
        let mut lines = input.lines();
        let mut pending: Option<PendingUpdate> = None;

        writeln!(out, "Cotizador de Planes - escriba 'ayuda' para ver los comandos")?;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    let command = match SessionCommand::parse(&line) {
                        Ok(Some(command)) => command,
                        Ok(None) => continue,
                        Err(message) => {
                            writeln!(out, "{}", message)?;
                            continue;
                        }
                    };

                    match command {
                        SessionCommand::Aportes(raw) => {
                            form.set_aportes(&raw);
                            writeln!(
                                out,
                                "Aporte Total Calculado: {}",
                                self.quote(&form).contribution_total
                            )?;
                        }
                        SessionCommand::Edad(raw) => form.set_edad(&raw),
                        SessionCommand::Plan(plan) => {
                            form.set_plan(plan);
                            writeln!(out, "Plan seleccionado: {}", plan.label())?;
                        }
                        SessionCommand::Cotizar => {
                            let view = self.quote(&form);
                            writeln!(out, "Resultado de la Cotización: {}", view.result)?;
                        }
                        SessionCommand::Actualizar(path) => {
                            if pending.is_some() {
                                writeln!(out, "{}", QuoterError::UpdateInProgress.user_friendly_message())?;
                                continue;
                            }
                            match load_image(&self.storage, &path).await {
                                Ok(image) => {
                                    let updater = self.updater.clone();
                                    let store = self.store.clone();
                                    pending = Some(tokio::spawn(async move {
                                        updater.update_from_image(&store, &image).await
                                    }));
                                    writeln!(out, "Procesando imagen...")?;
                                }
                                Err(e) => {
                                    tracing::warn!("Cannot load image '{}': {}", path, e);
                                    writeln!(out, "{}", e.user_friendly_message())?;
                                }
                            }
                        }
                        SessionCommand::Precios => writeln!(out, "{}", self.prices_report())?,
                        SessionCommand::Estado => {
                            writeln!(
                                out,
                                "Aportes: {:?}  Edad: {:?}  Plan: {}",
                                form.aportes(),
                                form.edad(),
                                form.plan().label()
                            )?;
                        }
                        SessionCommand::Ayuda => writeln!(out, "{}", HELP)?,
                        SessionCommand::Salir => break,
                    }
                }
                outcome = wait_pending(&mut pending), if pending.is_some() => {
                    pending = None;
                    report_update(out, outcome)?;
                }
            }
        }

        // 不支援取消：結束前等待進行中的更新完成
        if pending.is_some() {
            let outcome = wait_pending(&mut pending).await;
            report_update(out, outcome)?;
        }

        Ok(())
    }
}
