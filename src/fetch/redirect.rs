/// 会话丢失时把用户送回登录入口
///
/// 网页端是跳转，移动端是切换导航栈，命令行里只需要记录日志。
pub trait LoginRedirect: Send + Sync {
    fn redirect_to_login(&self, login_path: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogRedirect;

impl LoginRedirect for LogRedirect {
    fn redirect_to_login(&self, login_path: &str) {
        tracing::warn!("Session unavailable, sign in again at {}", login_path);
    }
}
