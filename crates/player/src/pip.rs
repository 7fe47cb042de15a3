// Picture-in-picture controller over the host capability
// Host failures are logged and swallowed; PiP is never fatal to playback.

use podium_video_core::{
    PictureInPictureBounds, PictureInPictureSetup, PipHost, PipParams, PipSupport, Rational,
    Rect,
};

pub struct PipController {
    host: Option<Box<dyn PipHost>>,
    bounds: Rect,
    auto_enter_cleared: bool,
}

impl PipController {
    pub fn new(host: Option<Box<dyn PipHost>>, screen_bounds: Rect) -> Self {
        Self {
            host,
            bounds: screen_bounds,
            auto_enter_cleared: false,
        }
    }

    /// Current session bounds, aspect-corrected once the video size is known
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    fn aspect_ratio(&self) -> Rational {
        Rational::new(self.bounds.width(), self.bounds.height())
    }

    fn support(&self) -> PipSupport {
        self.host
            .as_ref()
            .map(|host| host.support())
            .unwrap_or(PipSupport::Unsupported)
    }

    fn params(&self, support: PipSupport) -> PipParams {
        let auto_enter = support >= PipSupport::AutoEnter;

        PipParams {
            aspect_ratio: self.aspect_ratio(),
            source_rect_hint: Some(self.bounds),
            auto_enter_enabled: auto_enter.then_some(true),
            seamless_resize_enabled: auto_enter.then_some(false),
        }
    }

    /// Enter PiP if the host supports it; otherwise a silent no-op
    pub fn enter(&mut self) {
        let support = self.support();
        if support == PipSupport::Unsupported {
            log::warn!("Picture-in-picture not supported on this device");
            return;
        }

        let params = (support >= PipSupport::Params).then(|| self.params(support));
        if let Some(host) = self.host.as_mut() {
            if let Err(e) = host.enter(params.as_ref()) {
                log::error!("Failed to enter picture-in-picture: {}", e);
            }
        }
    }

    /// Turn auto-enter off again. Safe to call repeatedly.
    pub fn remove_options(&mut self) {
        if self.auto_enter_cleared || self.support() < PipSupport::AutoEnter {
            return;
        }
        self.auto_enter_cleared = true;

        let params = PipParams {
            aspect_ratio: self.aspect_ratio(),
            source_rect_hint: None,
            auto_enter_enabled: Some(false),
            seamless_resize_enabled: None,
        };
        if let Some(host) = self.host.as_mut() {
            if let Err(e) = host.set_params(&params) {
                log::error!("Failed to clear picture-in-picture options: {}", e);
            }
        }
    }
}

impl PictureInPictureSetup for PipController {
    fn prepare(&mut self, width: i32, height: i32) -> bool {
        let derived = PictureInPictureBounds::derive(self.bounds, width, height);
        self.bounds = derived.rect;
        log::debug!("PiP bounds updated to {:?}", self.bounds);

        let support = self.support();
        if support < PipSupport::Params {
            return false;
        }

        let params = self.params(support);
        match self.host.as_mut().map(|host| host.set_params(&params)) {
            Some(Ok(())) => true,
            Some(Err(e)) => {
                log::error!("Failed to set picture-in-picture params: {}", e);
                false
            }
            None => false,
        }
    }
}
