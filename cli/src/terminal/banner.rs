use colored::*;

use crate::terminal::print;

const BANNER: &str = r#"
                __        __               __
 _   __ __  __ / /____   / /_ ___   _____ / /_   _  __
| | / // / / // // __ \ / __// _ \ / ___// __ \ | |/_/
| |/ // /_/ // // / / // /_ /  __// /__ / / / /_>  <
|___/ \__,_//_//_/ /_/ \__/ \___/ \___//_/ /_//_/|_|
"#;

pub fn print() {
    print::print(&format!("{}", BANNER.bright_cyan().bold()));
}
