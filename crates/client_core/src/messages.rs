use std::{fmt, str::FromStr};

use crate::error::{LoginError, MissingField};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    English,
    Vietnamese,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "english" => Ok(Locale::English),
            "vi" | "vi-vn" | "vietnamese" => Ok(Locale::Vietnamese),
            other => Err(format!("unsupported locale '{other}'")),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Locale::English => "en",
            Locale::Vietnamese => "vi",
        })
    }
}

pub fn login_succeeded(locale: Locale) -> &'static str {
    match locale {
        Locale::English => "Login successful!",
        Locale::Vietnamese => "Đăng nhập thành công!",
    }
}

pub fn login_failed(error: &LoginError, locale: Locale) -> String {
    use Locale::{English, Vietnamese};

    let text = match (error, locale) {
        (LoginError::Validation(MissingField::Username), English) => "Please enter your username!",
        (LoginError::Validation(MissingField::Username), Vietnamese) => {
            "Vui lòng nhập tên đăng nhập!"
        }
        (LoginError::Validation(MissingField::Password), English) => "Please enter your password!",
        (LoginError::Validation(MissingField::Password), Vietnamese) => "Vui lòng nhập mật khẩu!",
        (LoginError::InvalidCredentials, English) => "Incorrect username or password!",
        (LoginError::InvalidCredentials, Vietnamese) => "Tên đăng nhập hoặc mật khẩu không đúng!",
        (LoginError::UnsupportedGrantType, English) => {
            "Grant type is not supported. Please contact an administrator!"
        }
        (LoginError::UnsupportedGrantType, Vietnamese) => {
            "Loại grant không được hỗ trợ. Vui lòng liên hệ quản trị viên!"
        }
        (LoginError::ServerProvidedMessage(message), _) => return message.clone(),
        (LoginError::Rejected, English) => "Login failed. Please try again!",
        (LoginError::Rejected, Vietnamese) => "Đăng nhập thất bại. Vui lòng thử lại!",
        (LoginError::Connection(_), English) => "Could not connect to the server. Please try again!",
        (LoginError::Connection(_), Vietnamese) => "Lỗi kết nối đến server. Vui lòng thử lại!",
        (LoginError::Busy, English) => "Login is already in progress.",
        (LoginError::Busy, Vietnamese) => "Đang đăng nhập, vui lòng chờ.",
    };
    text.to_string()
}
