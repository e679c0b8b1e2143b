pub mod captcha;
pub mod contact;

pub use captcha::CaptchaVerifier;
pub use contact::ContactService;
