//! Stream descriptors: which endpoint to dial and how to decode its frames.
//!
//! Single streams live at `<base>/ws/<name>`; combined streams at
//! `<base>/stream?streams=<a>/<b>` and wrap every payload in a
//! `{"stream": .., "data": ..}` envelope. A descriptor decodes both shapes
//! into the same event type.

use std::fmt;
use std::marker::PhantomData;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::AsterError;
use crate::types::KlineInterval;
use crate::ws::messages::{
    AggTradeEvent, BookTickerEvent, DepthEvent, KlineEvent, MarkPriceEvent, MarketStatEvent,
    MiniTickerEvent,
};

/// Whether a frame carries one event or an array of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Payload {
    One,
    Many,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Endpoint plus decoder for one subscription.
pub struct StreamDescriptor<T> {
    streams: Vec<String>,
    combined: bool,
    payload: Payload,
    _event: PhantomData<fn() -> T>,
}

impl<T> StreamDescriptor<T> {
    /// A single stream by raw name, e.g. `btcusdt@depth`.
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            streams: vec![name.into()],
            combined: false,
            payload: Payload::One,
            _event: PhantomData,
        }
    }

    /// Several streams over one connection.
    pub fn combined<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            streams: names.into_iter().map(Into::into).collect(),
            combined: true,
            payload: Payload::One,
            _event: PhantomData,
        }
    }

    /// Frames carry a JSON array; the handler is called once per element.
    fn many(mut self) -> Self {
        self.payload = Payload::Many;
        self
    }

    pub fn stream_names(&self) -> &[String] {
        &self.streams
    }

    pub fn is_combined(&self) -> bool {
        self.combined
    }

    /// Full URL of this stream on `base_url`.
    pub fn url(&self, base_url: &str) -> Result<String, AsterError> {
        let base = base_url.trim_end_matches('/');
        match (self.combined, self.streams.as_slice()) {
            (_, []) => Err(AsterError::InvalidConfig("no streams to subscribe to".into())),
            (false, [name]) => Ok(format!("{base}/ws/{name}")),
            (false, _) => Err(AsterError::InvalidConfig(
                "a single-stream descriptor names exactly one stream".into(),
            )),
            (true, names) => Ok(format!("{base}/stream?streams={}", names.join("/"))),
        }
    }
}

impl<T: DeserializeOwned> StreamDescriptor<T> {
    /// Decode one frame into its events.
    pub fn decode(&self, frame: &[u8]) -> Result<Vec<T>, AsterError> {
        let events = match (self.combined, self.payload) {
            (false, Payload::One) => vec![serde_json::from_slice(frame)?],
            (false, Payload::Many) => serde_json::from_slice(frame)?,
            (true, Payload::One) => vec![serde_json::from_slice::<Envelope<T>>(frame)?.data],
            (true, Payload::Many) => serde_json::from_slice::<Envelope<Vec<T>>>(frame)?.data,
        };
        Ok(events)
    }
}

impl<T> Clone for StreamDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            streams: self.streams.clone(),
            combined: self.combined,
            payload: self.payload,
            _event: PhantomData,
        }
    }
}

impl<T> fmt::Debug for StreamDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamDescriptor")
            .field("streams", &self.streams)
            .field("combined", &self.combined)
            .field("event", &std::any::type_name::<T>())
            .finish()
    }
}

fn name(symbol: &str, kind: &str) -> String {
    format!("{}@{kind}", symbol.to_lowercase())
}

/// Diff depth updates.
pub fn depth(symbol: &str) -> StreamDescriptor<DepthEvent> {
    StreamDescriptor::single(name(symbol, "depth"))
}

/// Top `levels` (5, 10 or 20) of the book.
pub fn partial_depth(symbol: &str, levels: u8) -> StreamDescriptor<DepthEvent> {
    StreamDescriptor::single(name(symbol, &format!("depth{levels}")))
}

/// Top `levels` of the book at 100ms updates, as served by futures.
pub fn partial_depth_100ms(symbol: &str, levels: u8) -> StreamDescriptor<DepthEvent> {
    StreamDescriptor::single(name(symbol, &format!("depth{levels}@100ms")))
}

pub fn agg_trade(symbol: &str) -> StreamDescriptor<AggTradeEvent> {
    StreamDescriptor::single(name(symbol, "aggTrade"))
}

pub fn kline(symbol: &str, interval: KlineInterval) -> StreamDescriptor<KlineEvent> {
    StreamDescriptor::single(name(symbol, &format!("kline_{interval}")))
}

pub fn book_ticker(symbol: &str) -> StreamDescriptor<BookTickerEvent> {
    StreamDescriptor::single(name(symbol, "bookTicker"))
}

/// Best bid/ask updates for every symbol.
pub fn all_book_tickers() -> StreamDescriptor<BookTickerEvent> {
    StreamDescriptor::single("!bookTicker")
}

pub fn mini_ticker(symbol: &str) -> StreamDescriptor<MiniTickerEvent> {
    StreamDescriptor::single(name(symbol, "miniTicker"))
}

/// Rolling 24h statistics for one symbol.
pub fn ticker(symbol: &str) -> StreamDescriptor<MarketStatEvent> {
    StreamDescriptor::single(name(symbol, "ticker"))
}

/// Rolling 24h statistics for every symbol that changed.
pub fn all_market_tickers() -> StreamDescriptor<MarketStatEvent> {
    StreamDescriptor::single("!ticker@arr").many()
}

/// Futures mark price and funding rate.
pub fn mark_price(symbol: &str) -> StreamDescriptor<MarkPriceEvent> {
    StreamDescriptor::single(name(symbol, "markPrice"))
}

/// Mark prices of every futures symbol, one handler call per symbol.
pub fn all_mark_prices() -> StreamDescriptor<MarkPriceEvent> {
    StreamDescriptor::single("!markPrice@arr").many()
}

/// Account and order updates for a listen key.
///
/// `E` is the market's event type, e.g.
/// [`FuturesUserDataEvent`](crate::futures::FuturesUserDataEvent).
pub fn user_data<E>(listen_key: &str) -> StreamDescriptor<E> {
    StreamDescriptor::single(listen_key)
}

pub fn combined_depth<S: AsRef<str>>(symbols: &[S]) -> StreamDescriptor<DepthEvent> {
    StreamDescriptor::combined(symbols.iter().map(|s| name(s.as_ref(), "depth")))
}

pub fn combined_agg_trade<S: AsRef<str>>(symbols: &[S]) -> StreamDescriptor<AggTradeEvent> {
    StreamDescriptor::combined(symbols.iter().map(|s| name(s.as_ref(), "aggTrade")))
}

/// One kline stream per `(symbol, interval)` pair.
pub fn combined_kline<S: AsRef<str>>(
    pairs: &[(S, KlineInterval)],
) -> StreamDescriptor<KlineEvent> {
    StreamDescriptor::combined(
        pairs
            .iter()
            .map(|(symbol, interval)| name(symbol.as_ref(), &format!("kline_{interval}"))),
    )
}

pub fn combined_book_ticker<S: AsRef<str>>(symbols: &[S]) -> StreamDescriptor<BookTickerEvent> {
    StreamDescriptor::combined(symbols.iter().map(|s| name(s.as_ref(), "bookTicker")))
}
