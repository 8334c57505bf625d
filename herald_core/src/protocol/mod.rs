/*!
 * Protocol layer: what we send to the Telegram Bot API.
 *
 * - `constants`: default endpoint, pacing and timeout values
 * - `request`: `SendRequest` construction and well-formedness checks
 */

pub mod constants;
pub mod request;
