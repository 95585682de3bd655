// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for the Vyvoz intake bot.
//!
//! Implements [`ChannelAdapter`] for the Telegram Bot API via teloxide:
//! long polling of private messages and button presses, inline keyboards
//! on replies, photo captions, and photo downloads at finalization time.

pub mod handler;
pub mod outbound;

use async_trait::async_trait;
use teloxide::dispatching::ShutdownToken;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{FileId, InlineKeyboardMarkup, InputFile};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use vyvoz_config::model::TelegramConfig;
use vyvoz_core::types::{InboundEvent, OutboundMessage, Recipient};
use vyvoz_core::{
    AdapterType, ChannelAdapter, HealthStatus, MessageId, PhotoRef, PluginAdapter, VyvozError,
};

/// Capacity of the queue between the dispatcher and the dialogue loop.
const INBOUND_QUEUE: usize = 100;

/// Telegram channel adapter implementing [`ChannelAdapter`].
pub struct TelegramChannel {
    bot: Bot,
    operator_chat: Option<ChatId>,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundEvent>>,
    inbound_tx: mpsc::Sender<InboundEvent>,
    shutdown_token: Option<ShutdownToken>,
}

impl TelegramChannel {
    /// Creates the adapter. Requires `telegram.bot_token`.
    pub fn new(config: &TelegramConfig) -> Result<Self, VyvozError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            VyvozError::Config("telegram.bot_token is required for the Telegram adapter".into())
        })?;
        if token.is_empty() {
            return Err(VyvozError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_QUEUE);
        Ok(Self {
            bot: Bot::new(token),
            operator_chat: config.operator_chat_id.map(ChatId),
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            shutdown_token: None,
        })
    }

    fn chat_for(&self, recipient: Recipient) -> Option<ChatId> {
        match recipient {
            Recipient::User(user) => Some(ChatId(user.0)),
            Recipient::Operators => self.operator_chat,
        }
    }

    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        markup: Option<InlineKeyboardMarkup>,
    ) -> Result<Message, VyvozError> {
        let mut request = self.bot.send_message(chat_id, text);
        if let Some(markup) = markup {
            request = request.reply_markup(markup);
        }
        request.await.map_err(|e| VyvozError::Channel {
            message: format!("failed to send message: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, VyvozError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), VyvozError> {
        let Some(token) = &self.shutdown_token else {
            return Ok(());
        };
        match token.shutdown() {
            Ok(stopped) => {
                stopped.await;
                debug!("Telegram polling stopped");
            }
            Err(_) => debug!("Telegram dispatcher already idle"),
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    async fn connect(&mut self) -> Result<(), VyvozError> {
        if self.shutdown_token.is_some() {
            return Ok(());
        }

        let message_tx = self.inbound_tx.clone();
        let callback_tx = self.inbound_tx.clone();

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(move |msg: Message| {
                let tx = message_tx.clone();
                async move {
                    if !handler::is_dm(&msg) {
                        debug!(chat_id = msg.chat.id.0, "ignoring non-DM message");
                        return respond(());
                    }
                    match handler::message_event(&msg) {
                        Some(event) => {
                            if tx.send(event).await.is_err() {
                                warn!("inbound channel closed, dropping message");
                            }
                        }
                        None => debug!(msg_id = msg.id.0, "ignoring message without sender"),
                    }
                    respond(())
                }
            }))
            .branch(Update::filter_callback_query().endpoint(
                move |bot: Bot, query: CallbackQuery| {
                    let tx = callback_tx.clone();
                    async move {
                        // Clears the button's loading state whatever happens next.
                        if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
                            warn!(error = %e, "failed to answer callback query");
                        }
                        if !handler::is_dm_callback(&query) {
                            debug!("ignoring non-DM button press");
                            return respond(());
                        }
                        if let Some(event) = handler::callback_event(&query)
                            && tx.send(event).await.is_err()
                        {
                            warn!("inbound channel closed, dropping button press");
                        }
                        respond(())
                    }
                },
            ));

        let mut dispatcher = Dispatcher::builder(self.bot.clone(), handler)
            .default_handler(|_| async {})
            .build();
        self.shutdown_token = Some(dispatcher.shutdown_token());

        info!("starting Telegram long polling");
        tokio::spawn(async move {
            dispatcher.dispatch().await;
        });
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, VyvozError> {
        let Some(chat_id) = self.chat_for(msg.recipient) else {
            info!(text = msg.text.as_str(), "no operator chat configured, message logged only");
            return Ok(MessageId(String::new()));
        };

        let markup = msg.keyboard.as_ref().map(outbound::to_markup);
        let text = outbound::clamp_text(&msg.text);

        let sent = match msg.photo {
            Some(PhotoRef(file_id)) if outbound::fits_caption(text) => {
                let mut request = self
                    .bot
                    .send_photo(chat_id, InputFile::file_id(FileId(file_id)))
                    .caption(text);
                if let Some(markup) = markup {
                    request = request.reply_markup(markup);
                }
                request.await.map_err(|e| VyvozError::Channel {
                    message: format!("failed to send photo: {e}"),
                    source: Some(Box::new(e)),
                })?
            }
            Some(PhotoRef(file_id)) => {
                // Too long for a caption: photo first, then the text.
                self.bot
                    .send_photo(chat_id, InputFile::file_id(FileId(file_id)))
                    .await
                    .map_err(|e| VyvozError::Channel {
                        message: format!("failed to send photo: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                self.send_text(chat_id, text, markup).await?
            }
            None => self.send_text(chat_id, text, markup).await?,
        };

        Ok(MessageId(sent.id.0.to_string()))
    }

    async fn receive(&self) -> Result<InboundEvent, VyvozError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| VyvozError::Channel {
            message: "Telegram inbound channel closed".into(),
            source: None,
        })
    }

    async fn download_photo(&self, photo: &PhotoRef) -> Result<Vec<u8>, VyvozError> {
        let file = self
            .bot
            .get_file(FileId(photo.0.clone()))
            .await
            .map_err(|e| VyvozError::Channel {
                message: format!("failed to get file info: {e}"),
                source: Some(Box::new(e)),
            })?;

        let mut buf = Vec::new();
        self.bot
            .download_file(&file.path, &mut buf)
            .await
            .map_err(|e| VyvozError::Channel {
                message: format!("failed to download file: {e}"),
                source: Some(Box::new(e)),
            })?;

        debug!(file_id = photo.0.as_str(), size = buf.len(), "downloaded photo");
        Ok(buf)
    }
}
