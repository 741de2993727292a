//! Client-side behavior shipped with every page
//!
//! The state machines here are the reference for the inline script: the
//! script is generated from the same constants.

mod scroll;
mod share;

pub use scroll::{FrameThrottle, ScrollAffordance, Visibility, SCROLL_THRESHOLD};
pub use share::{share_links, ShareLink};

/// localStorage key holding the chosen theme
pub const THEME_STORAGE_KEY: &str = "theme";

/// Inline script: theme set before first paint, cover swap after mount, scroll-to-top
pub fn inline_script() -> String {
    format!(
        r#"<script>
(function() {{
    var root = document.documentElement;
    var stored = localStorage.getItem('{key}');
    var dark = stored ? stored === 'dark' : window.matchMedia('(prefers-color-scheme: dark)').matches;

    function setTheme() {{
        root.dataset.theme = dark ? 'dark' : 'light';
    }}

    function swapCover() {{
        var cover = document.querySelector('img[data-cover]');
        if (cover) {{
            var light = cover.dataset.coverLight, darkSrc = cover.dataset.coverDark, base = cover.dataset.coverDefault;
            var src = dark ? (darkSrc || light || base) : (light || darkSrc || base);
            if (src && cover.getAttribute('src') !== src) cover.setAttribute('src', src);
        }}
    }}

    setTheme();

    document.addEventListener('DOMContentLoaded', function() {{
        root.dataset.mounted = 'true';
        swapCover();

        var toggle = document.querySelector('[data-theme-toggle]');
        if (toggle) toggle.addEventListener('click', function() {{
            dark = !dark;
            localStorage.setItem('{key}', dark ? 'dark' : 'light');
            setTheme();
            swapCover();
        }});

        var button = document.querySelector('[data-scroll-top]');
        if (!button) return;
        var rafId = null;
        function update() {{
            var top = window.pageYOffset || root.scrollTop;
            button.hidden = !(top > {threshold});
            rafId = null;
        }}
        window.addEventListener('scroll', function() {{
            if (rafId === null) rafId = requestAnimationFrame(update);
        }}, {{ passive: true }});
        button.addEventListener('click', function() {{
            window.scrollTo({{ top: 0, behavior: 'smooth' }});
        }});
        update();
    }});
}})();
</script>"#,
        key = THEME_STORAGE_KEY,
        threshold = SCROLL_THRESHOLD,
    )
}
